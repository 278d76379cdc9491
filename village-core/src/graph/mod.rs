//! Labeled-graph store adapter.
//!
//! The simulation keeps its population as facts `(subject, attribute, value)`
//! about typed nodes. Everything the engine knows is read through [`Query`]
//! and written through [`Delta`], so any store that can answer those two
//! shapes can back a run. [`MemoryGraph`] is the in-process implementation.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub mod delta;
pub mod memory;
pub mod query;

pub use delta::{Delta, Removal};
pub use memory::MemoryGraph;
pub use query::{Filter, Query, Row};

// === NODES ===

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum RecordKind {
    Person,
    Family,
    Resource,
    Emergency,
    /// Bookkeeping node holding the identifier allocator's counters.
    Allocator,
}

impl RecordKind {
    /// Kinds whose identifiers are minted by the allocator.
    pub fn all() -> impl Iterator<Item = RecordKind> {
        [
            RecordKind::Person,
            RecordKind::Family,
            RecordKind::Resource,
            RecordKind::Emergency,
        ]
        .into_iter()
    }

    pub fn prefix(self) -> &'static str {
        match self {
            RecordKind::Person => "person",
            RecordKind::Family => "family",
            RecordKind::Resource => "resource",
            RecordKind::Emergency => "emergency",
            RecordKind::Allocator => "allocator",
        }
    }
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct NodeId {
    pub kind: RecordKind,
    pub index: u32,
}

impl NodeId {
    pub fn new(kind: RecordKind, index: u32) -> Self {
        Self { kind, index }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.prefix(), self.index)
    }
}

// === ATTRIBUTES ===

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Attr {
    // Person
    Gender,
    Age,
    Alive,
    Health,
    Profession,
    Partner,
    Mother,
    Father,
    Child,
    FirstName,
    LastName,
    // Person, resource and emergency owner
    Family,
    // Family
    Resource,
    Emergency,
    // Resource
    Name,
    Quantity,
    // Emergency
    Active,
    StartDate,
    // Allocator: next identifier to mint for a kind
    NextId(RecordKind),
}

impl Attr {
    /// Attributes that may hold several values on one node.
    pub fn is_multi(self) -> bool {
        matches!(self, Attr::Child | Attr::Resource)
    }
}

#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Value {
    Node(NodeId),
    Int(i64),
    Bool(bool),
    Text(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Node(_) => "node",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Text(_) => "text",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Value::Node(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<NodeId> for Value {
    fn from(node: NodeId) -> Self {
        Value::Node(node)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub subject: NodeId,
    pub attr: Attr,
    pub value: Value,
}

// === ADAPTER ===

/// A labeled-graph store the simulation reads from and writes to.
///
/// Each call is a synchronous request/response. `apply_delta` must be
/// all-or-nothing: either every removal and insertion lands or none does.
pub trait GraphStore {
    fn query(&self, query: &Query) -> Result<Vec<Row>, StoreError>;

    fn apply_delta(&mut self, delta: &Delta) -> Result<(), StoreError>;

    /// Serialize the whole graph to `path`.
    fn export_snapshot(&self, path: &Path) -> Result<(), StoreError>;
}
