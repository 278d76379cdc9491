//! Transactional change sets.

use super::{Attr, Fact, NodeId, Value};

#[derive(Clone, Debug, PartialEq)]
pub struct Removal {
    pub subject: NodeId,
    pub attr: Attr,
    /// `None` removes every value of the attribute.
    pub value: Option<Value>,
}

/// A set of changes applied as one unit.
///
/// Application order is: node deletions, fact removals, node creations,
/// fact insertions. Removing a fact that is not present is a no-op, so
/// `remove` followed by `insert` is the way to replace a value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Delta {
    pub deletes: Vec<NodeId>,
    pub removals: Vec<Removal>,
    pub creates: Vec<NodeId>,
    pub inserts: Vec<Fact>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty()
            && self.removals.is_empty()
            && self.creates.is_empty()
            && self.inserts.is_empty()
    }

    pub fn create(mut self, node: impl Into<NodeId>) -> Self {
        self.creates.push(node.into());
        self
    }

    pub fn delete(mut self, node: impl Into<NodeId>) -> Self {
        self.deletes.push(node.into());
        self
    }

    pub fn insert(mut self, subject: impl Into<NodeId>, attr: Attr, value: impl Into<Value>) -> Self {
        self.inserts.push(Fact {
            subject: subject.into(),
            attr,
            value: value.into(),
        });
        self
    }

    /// Remove every value of `attr` on `subject`.
    pub fn remove(mut self, subject: impl Into<NodeId>, attr: Attr) -> Self {
        self.removals.push(Removal {
            subject: subject.into(),
            attr,
            value: None,
        });
        self
    }

    /// Remove one specific value of `attr` on `subject`.
    pub fn remove_value(
        mut self,
        subject: impl Into<NodeId>,
        attr: Attr,
        value: impl Into<Value>,
    ) -> Self {
        self.removals.push(Removal {
            subject: subject.into(),
            attr,
            value: Some(value.into()),
        });
        self
    }

    /// Replace the value of a single-valued attribute.
    pub fn set(self, subject: impl Into<NodeId>, attr: Attr, value: impl Into<Value>) -> Self {
        let subject = subject.into();
        self.remove(subject, attr).insert(subject, attr, value)
    }

    /// Fold another delta into this one, keeping each section's order.
    pub fn merge(mut self, other: Delta) -> Self {
        self.deletes.extend(other.deletes);
        self.removals.extend(other.removals);
        self.creates.extend(other.creates);
        self.inserts.extend(other.inserts);
        self
    }
}
