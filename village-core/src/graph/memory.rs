//! In-process labeled-graph store.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Attr, Delta, Fact, GraphStore, NodeId, Query, Row, Value};
use crate::error::StoreError;

type Properties = BTreeMap<Attr, Vec<Value>>;

/// Pending state for nodes touched by a delta; `None` marks a deletion.
type Staged = BTreeMap<NodeId, Option<Properties>>;

/// Serialized form of a whole graph.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    nodes: Vec<NodeId>,
    facts: Vec<Fact>,
}

/// Graph store held entirely in memory.
///
/// Nodes are ordered by (kind, index), so a query over one kind is a range
/// scan and results come back in identifier order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryGraph {
    nodes: BTreeMap<NodeId, Properties>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a graph from a file written by [`GraphStore::export_snapshot`].
    pub fn from_snapshot(path: &Path) -> Result<Self, StoreError> {
        let file = File::open(path).map_err(|source| StoreError::SnapshotIo {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file))?;

        let mut graph = Self::new();
        graph.apply_delta(&Delta {
            creates: snapshot.nodes,
            inserts: snapshot.facts,
            ..Delta::default()
        })?;
        Ok(graph)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Every fact in the graph, in node order.
    pub fn facts(&self) -> impl Iterator<Item = Fact> + '_ {
        self.nodes.iter().flat_map(|(node, props)| {
            props.iter().flat_map(move |(attr, values)| {
                values.iter().map(move |value| Fact {
                    subject: *node,
                    attr: *attr,
                    value: value.clone(),
                })
            })
        })
    }

    fn candidates<'a>(&'a self, query: &Query) -> Box<dyn Iterator<Item = (&'a NodeId, &'a Properties)> + 'a> {
        match query.subject {
            Some(node) if node.kind == query.kind => Box::new(self.nodes.get_key_value(&node).into_iter()),
            Some(_) => Box::new(std::iter::empty()),
            None => Box::new(
                self.nodes
                    .range(NodeId::new(query.kind, 0)..=NodeId::new(query.kind, u32::MAX)),
            ),
        }
    }
}

fn values_of(props: &Properties, attr: Attr) -> &[Value] {
    props.get(&attr).map(Vec::as_slice).unwrap_or(&[])
}

fn exists(nodes: &BTreeMap<NodeId, Properties>, staged: &Staged, node: NodeId) -> bool {
    match staged.get(&node) {
        Some(slot) => slot.is_some(),
        None => nodes.contains_key(&node),
    }
}

fn stage<'a>(
    nodes: &BTreeMap<NodeId, Properties>,
    staged: &'a mut Staged,
    node: NodeId,
) -> Result<&'a mut Properties, StoreError> {
    let slot = match staged.entry(node) {
        Entry::Occupied(e) => e.into_mut(),
        Entry::Vacant(e) => {
            let props = nodes.get(&node).ok_or(StoreError::UnknownNode(node))?.clone();
            e.insert(Some(props))
        }
    };
    slot.as_mut().ok_or(StoreError::UnknownNode(node))
}

impl GraphStore for MemoryGraph {
    fn query(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        let matched = self.candidates(query).filter(|(_, props)| {
            query
                .filters
                .iter()
                .all(|f| f.matches(values_of(props, f.attr())))
                && query
                    .required
                    .iter()
                    .all(|attr| !values_of(props, *attr).is_empty())
        });

        if let Some(group) = query.group_by {
            let mut counts: BTreeMap<Value, usize> = BTreeMap::new();
            for (_, props) in matched {
                if let Some(key) = values_of(props, group).first() {
                    *counts.entry(key.clone()).or_insert(0) += 1;
                }
            }
            return Ok(counts
                .into_iter()
                .map(|(key, count)| Row {
                    subject: None,
                    values: BTreeMap::from([(group, vec![key])]),
                    count,
                })
                .collect());
        }

        Ok(matched
            .map(|(node, props)| {
                let values = query
                    .required
                    .iter()
                    .chain(&query.optional)
                    .filter_map(|attr| props.get(attr).map(|vs| (*attr, vs.clone())))
                    .collect();
                Row {
                    subject: Some(*node),
                    values,
                    count: 1,
                }
            })
            .collect())
    }

    fn apply_delta(&mut self, delta: &Delta) -> Result<(), StoreError> {
        let mut staged = Staged::new();

        for node in &delta.deletes {
            if !exists(&self.nodes, &staged, *node) {
                return Err(StoreError::UnknownNode(*node));
            }
            staged.insert(*node, None);
        }

        for removal in &delta.removals {
            let props = stage(&self.nodes, &mut staged, removal.subject)?;
            match &removal.value {
                None => {
                    props.remove(&removal.attr);
                }
                Some(value) => {
                    if let Some(values) = props.get_mut(&removal.attr) {
                        values.retain(|v| v != value);
                        if values.is_empty() {
                            props.remove(&removal.attr);
                        }
                    }
                }
            }
        }

        for node in &delta.creates {
            if exists(&self.nodes, &staged, *node) {
                return Err(StoreError::DuplicateNode(*node));
            }
            staged.insert(*node, Some(Properties::new()));
        }

        for fact in &delta.inserts {
            if let Value::Node(target) = &fact.value {
                if !exists(&self.nodes, &staged, *target) {
                    return Err(StoreError::UnknownNode(*target));
                }
            }
            let values = stage(&self.nodes, &mut staged, fact.subject)?
                .entry(fact.attr)
                .or_default();
            if !values.contains(&fact.value) {
                values.push(fact.value.clone());
            }
        }

        for (node, slot) in &staged {
            let Some(props) = slot else { continue };
            for (attr, values) in props {
                if !attr.is_multi() && values.len() > 1 {
                    return Err(StoreError::Cardinality {
                        node: *node,
                        attr: *attr,
                        count: values.len(),
                    });
                }
            }
        }

        for (node, slot) in staged {
            match slot {
                Some(props) => {
                    self.nodes.insert(node, props);
                }
                None => {
                    self.nodes.remove(&node);
                }
            }
        }
        Ok(())
    }

    fn export_snapshot(&self, path: &Path) -> Result<(), StoreError> {
        let io_err = |source| StoreError::SnapshotIo {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = File::create(path).map_err(io_err)?;
        let snapshot = Snapshot {
            nodes: self.nodes.keys().copied().collect(),
            facts: self.facts().collect(),
        };
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &snapshot)?;
        writer.flush().map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Filter, RecordKind};

    fn person(i: u32) -> NodeId {
        NodeId::new(RecordKind::Person, i)
    }

    fn family(i: u32) -> NodeId {
        NodeId::new(RecordKind::Family, i)
    }

    fn village() -> MemoryGraph {
        let mut g = MemoryGraph::new();
        let delta = Delta::new()
            .create(family(1))
            .create(person(1))
            .create(person(2))
            .create(person(3))
            .insert(person(1), Attr::Family, family(1))
            .insert(person(1), Attr::Age, 7000u32)
            .insert(person(1), Attr::Profession, "farmer")
            .insert(person(2), Attr::Family, family(1))
            .insert(person(2), Attr::Age, 400u32)
            .insert(person(2), Attr::Profession, "farmer")
            .insert(person(2), Attr::Partner, person(3))
            .insert(person(3), Attr::Age, 9000u32)
            .insert(person(3), Attr::Profession, "fisher");
        g.apply_delta(&delta).unwrap();
        g
    }

    #[test]
    fn query_filters_by_kind_and_attributes() {
        let g = village();
        let rows = g
            .query(
                &Query::of(RecordKind::Person)
                    .select(Attr::Age)
                    .filter(Filter::gt(Attr::Age, 5000))
                    .filter(Filter::Missing(Attr::Partner)),
            )
            .unwrap();
        let subjects: Vec<_> = rows.iter().map(|r| r.subject.unwrap()).collect();
        assert_eq!(subjects, vec![person(1), person(3)]);
        assert_eq!(rows[0].int(Attr::Age).unwrap(), 7000);

        let families = g.query(&Query::of(RecordKind::Family)).unwrap();
        assert_eq!(families.len(), 1);
    }

    #[test]
    fn required_attributes_drop_rows_and_optional_ones_do_not() {
        let g = village();
        let rows = g
            .query(&Query::of(RecordKind::Person).select(Attr::Family).optional(Attr::Partner))
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].opt_node(Attr::Partner).unwrap(), Some(person(3)));
        assert_eq!(rows[0].opt_node(Attr::Partner).unwrap(), None);
    }

    #[test]
    fn grouped_count_per_value() {
        let g = village();
        let rows = g
            .query(
                &Query::of(RecordKind::Person)
                    .filter(Filter::eq(Attr::Family, family(1)))
                    .group_count(Attr::Profession),
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text(Attr::Profession).unwrap(), "farmer");
        assert_eq!(rows[0].count, 2);
    }

    #[test]
    fn failed_delta_changes_nothing() {
        let mut g = village();
        let before = g.clone();

        // Second insert makes Age two-valued on person 1.
        let bad = Delta::new()
            .set(person(2), Attr::Age, 401u32)
            .insert(person(1), Attr::Age, 1u32);
        assert!(matches!(g.apply_delta(&bad), Err(StoreError::Cardinality { .. })));
        assert_eq!(g, before);

        let dangling = Delta::new().insert(person(1), Attr::Partner, person(99));
        assert!(matches!(g.apply_delta(&dangling), Err(StoreError::UnknownNode(_))));
        assert_eq!(g, before);
    }

    #[test]
    fn set_replaces_and_delete_removes_node() {
        let mut g = village();
        g.apply_delta(&Delta::new().set(person(2), Attr::Age, 401u32)).unwrap();
        let row = g
            .query(&Query::of(RecordKind::Person).subject(person(2)).select(Attr::Age))
            .unwrap();
        assert_eq!(row[0].int(Attr::Age).unwrap(), 401);

        g.apply_delta(&Delta::new().delete(person(3)).remove(person(2), Attr::Partner))
            .unwrap();
        assert!(!g.contains(person(3)));
        assert!(matches!(
            g.apply_delta(&Delta::new().create(person(1))),
            Err(StoreError::DuplicateNode(_))
        ));
    }

    #[test]
    fn snapshot_round_trip() {
        let g = village();
        let dir = std::env::temp_dir().join(format!("village-snapshot-{}", std::process::id()));
        let path = dir.join("graph_1.json");
        g.export_snapshot(&path).unwrap();

        let restored = MemoryGraph::from_snapshot(&path).unwrap();
        assert_eq!(restored, g);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn large_snapshot_is_written_in_full() {
        let mut g = MemoryGraph::new();
        let mut delta = Delta::new().create(family(1));
        for i in 1..=500 {
            delta = delta
                .create(person(i))
                .insert(person(i), Attr::Family, family(1))
                .insert(person(i), Attr::FirstName, format!("Winik{i}"));
        }
        g.apply_delta(&delta).unwrap();

        let dir = std::env::temp_dir().join(format!("village-large-{}", std::process::id()));
        let path = dir.join("graph_1.json");
        g.export_snapshot(&path).unwrap();
        // Well past one writer buffer.
        assert!(std::fs::metadata(&path).unwrap().len() > 8 * 1024);

        let restored = MemoryGraph::from_snapshot(&path).unwrap();
        assert_eq!(restored, g);
        std::fs::remove_dir_all(&dir).ok();
    }
}
