//! Identifier allocation.
//!
//! One monotonically increasing counter per record kind. Identifiers are
//! never handed out twice, even after the record they named is removed:
//! the counters are written to an allocator node in the store, so a run
//! resumed from a snapshot carries on past every id the earlier run minted.
//! The allocator is plain data owned by whoever mints records; sharing it
//! across threads would need atomic counters or a store-side sequence.

use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::graph::{Attr, Delta, GraphStore, NodeId, Query, RecordKind};
use crate::ids::{EmergencyId, FamilyId, PersonId, ResourceId};

/// The store node holding the counters.
pub const ALLOCATOR_NODE: NodeId = NodeId {
    kind: RecordKind::Allocator,
    index: 0,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdAllocator {
    /// Next id per kind; a kind without an entry starts at 1.
    next: BTreeMap<RecordKind, u32>,
}

impl IdAllocator {
    /// Fresh counters; the first identifier of every kind is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue after everything `store` has seen: the counters it recorded
    /// and the highest identifier of each kind still present.
    pub fn resume<S: GraphStore>(store: &S) -> Result<Self, StoreError> {
        let marks = RecordKind::all()
            .fold(Query::of(RecordKind::Allocator).subject(ALLOCATOR_NODE), |q, kind| {
                q.optional(Attr::NextId(kind))
            });
        let marks = store.query(&marks)?;

        let mut ids = Self::new();
        for kind in RecordKind::all() {
            let highest = store
                .query(&Query::of(kind))?
                .iter()
                .filter_map(|row| row.subject)
                .map(|node| node.index)
                .max();
            let mut next = highest.map_or(1, |h| h + 1);

            let attr = Attr::NextId(kind);
            if let Some(row) = marks.iter().find(|row| row.first(attr).is_some()) {
                let mark = row.int(attr)?.clamp(1, i64::from(u32::MAX));
                next = next.max(mark as u32);
            }
            ids.next.insert(kind, next);
        }
        Ok(ids)
    }

    /// Write the counters to the store's allocator node.
    pub fn save<S: GraphStore>(&self, store: &mut S) -> Result<(), StoreError> {
        let exists = !store
            .query(&Query::of(RecordKind::Allocator).subject(ALLOCATOR_NODE))?
            .is_empty();
        let mut delta = if exists {
            Delta::new()
        } else {
            Delta::new().create(ALLOCATOR_NODE)
        };
        for kind in RecordKind::all() {
            let attr = Attr::NextId(kind);
            let next = self.peek(kind);
            delta = if exists {
                delta.set(ALLOCATOR_NODE, attr, next)
            } else {
                delta.insert(ALLOCATOR_NODE, attr, next)
            };
        }
        store.apply_delta(&delta)
    }

    fn peek(&self, kind: RecordKind) -> u32 {
        self.next.get(&kind).copied().unwrap_or(1)
    }

    fn take(&mut self, kind: RecordKind) -> u32 {
        let counter = self.next.entry(kind).or_insert(1);
        let id = *counter;
        *counter += 1;
        id
    }

    pub fn person(&mut self) -> PersonId {
        PersonId::new(self.take(RecordKind::Person))
    }

    pub fn family(&mut self) -> FamilyId {
        FamilyId::new(self.take(RecordKind::Family))
    }

    pub fn resource(&mut self) -> ResourceId {
        ResourceId::new(self.take(RecordKind::Resource))
    }

    pub fn emergency(&mut self) -> EmergencyId {
        EmergencyId::new(self.take(RecordKind::Emergency))
    }
}
