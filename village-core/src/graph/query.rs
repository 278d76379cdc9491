//! Typed query patterns and result rows.

use std::collections::BTreeMap;

use super::{Attr, NodeId, RecordKind, Value};
use crate::error::StoreError;

#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// Some value of the attribute equals the constant.
    Eq(Attr, Value),
    /// Some integer value of the attribute is greater than the constant.
    Gt(Attr, i64),
    /// The attribute has at least one value.
    Exists(Attr),
    /// The attribute has no value.
    Missing(Attr),
}

impl Filter {
    pub fn eq(attr: Attr, value: impl Into<Value>) -> Self {
        Filter::Eq(attr, value.into())
    }

    pub fn gt(attr: Attr, rhs: i64) -> Self {
        Filter::Gt(attr, rhs)
    }

    /// Evaluate against the values a node holds for the filtered attribute.
    pub fn matches(&self, values: &[Value]) -> bool {
        match self {
            Filter::Eq(_, expected) => values.iter().any(|v| v == expected),
            Filter::Gt(_, rhs) => values
                .iter()
                .filter_map(Value::as_int)
                .any(|v| v > *rhs),
            Filter::Exists(_) => !values.is_empty(),
            Filter::Missing(_) => values.is_empty(),
        }
    }

    pub fn attr(&self) -> Attr {
        match self {
            Filter::Eq(attr, _) | Filter::Gt(attr, _) | Filter::Exists(attr) | Filter::Missing(attr) => {
                *attr
            }
        }
    }
}

/// A declarative pattern over nodes of one kind.
///
/// Required attributes (`select`) drop nodes that lack them; optional ones
/// are returned when present. With `group_count`, one row is produced per
/// distinct value of the grouping attribute, carrying the number of nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub kind: RecordKind,
    pub subject: Option<NodeId>,
    pub required: Vec<Attr>,
    pub optional: Vec<Attr>,
    pub filters: Vec<Filter>,
    pub group_by: Option<Attr>,
}

impl Query {
    pub fn of(kind: RecordKind) -> Self {
        Self {
            kind,
            subject: None,
            required: Vec::new(),
            optional: Vec::new(),
            filters: Vec::new(),
            group_by: None,
        }
    }

    /// Restrict the pattern to a single bound node.
    pub fn subject(mut self, node: impl Into<NodeId>) -> Self {
        self.subject = Some(node.into());
        self
    }

    pub fn select(mut self, attr: Attr) -> Self {
        self.required.push(attr);
        self
    }

    pub fn select_all(mut self, attrs: &[Attr]) -> Self {
        self.required.extend_from_slice(attrs);
        self
    }

    pub fn optional(mut self, attr: Attr) -> Self {
        self.optional.push(attr);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn group_count(mut self, attr: Attr) -> Self {
        self.group_by = Some(attr);
        self
    }
}

/// One result of a [`Query`].
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Row {
    /// The matched node; `None` for grouped rows.
    pub subject: Option<NodeId>,
    pub values: BTreeMap<Attr, Vec<Value>>,
    /// 1 for plain rows, group size for grouped rows.
    pub count: usize,
}

impl Row {
    pub fn subject(&self) -> Result<NodeId, StoreError> {
        self.subject.ok_or(StoreError::GroupedRow)
    }

    pub fn first(&self, attr: Attr) -> Option<&Value> {
        self.values.get(&attr).and_then(|v| v.first())
    }

    fn require(&self, attr: Attr) -> Result<&Value, StoreError> {
        self.first(attr).ok_or(StoreError::MissingAttribute {
            node: self.subject,
            attr,
        })
    }

    fn mismatch(&self, attr: Attr, expected: &'static str, found: &Value) -> StoreError {
        StoreError::TypeMismatch {
            node: self.subject,
            attr,
            expected,
            found: found.type_name().to_string(),
        }
    }

    pub fn int(&self, attr: Attr) -> Result<i64, StoreError> {
        let v = self.require(attr)?;
        v.as_int().ok_or_else(|| self.mismatch(attr, "int", v))
    }

    pub fn bool(&self, attr: Attr) -> Result<bool, StoreError> {
        let v = self.require(attr)?;
        v.as_bool().ok_or_else(|| self.mismatch(attr, "bool", v))
    }

    pub fn node(&self, attr: Attr) -> Result<NodeId, StoreError> {
        let v = self.require(attr)?;
        v.as_node().ok_or_else(|| self.mismatch(attr, "node", v))
    }

    pub fn text(&self, attr: Attr) -> Result<&str, StoreError> {
        let v = self.require(attr)?;
        v.as_text().ok_or_else(|| self.mismatch(attr, "text", v))
    }

    pub fn opt_node(&self, attr: Attr) -> Result<Option<NodeId>, StoreError> {
        match self.first(attr) {
            None => Ok(None),
            Some(v) => v
                .as_node()
                .map(Some)
                .ok_or_else(|| self.mismatch(attr, "node", v)),
        }
    }

    pub fn nodes(&self, attr: Attr) -> Vec<NodeId> {
        self.values
            .get(&attr)
            .map(|vs| vs.iter().filter_map(Value::as_node).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_match_any_value() {
        let values = vec![Value::Int(3), Value::Int(9)];
        assert!(Filter::gt(Attr::Age, 5).matches(&values));
        assert!(!Filter::gt(Attr::Age, 9).matches(&values));
        assert!(Filter::eq(Attr::Age, 3i64).matches(&values));
        assert!(Filter::Exists(Attr::Age).matches(&values));
        assert!(Filter::Missing(Attr::Partner).matches(&[]));
    }

    #[test]
    fn comparisons_ignore_non_integers() {
        let values = vec![Value::Text("7".into())];
        assert!(!Filter::gt(Attr::Age, 1).matches(&values));
    }

    #[test]
    fn row_accessors_report_type_mismatches() {
        let mut row = Row {
            subject: Some(NodeId::new(RecordKind::Person, 1)),
            count: 1,
            ..Default::default()
        };
        row.values.insert(Attr::Age, vec![Value::Bool(true)]);
        assert!(matches!(
            row.int(Attr::Age),
            Err(StoreError::TypeMismatch { .. })
        ));
        assert!(matches!(
            row.int(Attr::Health),
            Err(StoreError::MissingAttribute { .. })
        ));
        assert_eq!(row.opt_node(Attr::Partner).unwrap(), None);
    }
}
