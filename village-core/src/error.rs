use std::path::PathBuf;

use crate::graph::{Attr, NodeId, RecordKind};

/// Failures raised by a graph store adapter.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("node {0} already exists")]
    DuplicateNode(NodeId),

    #[error("node {node} is not a {expected:?}")]
    WrongKind { node: NodeId, expected: RecordKind },

    #[error("{} has no {attr:?}", label(.node))]
    MissingAttribute { node: Option<NodeId>, attr: Attr },

    #[error("{}.{attr:?} holds {found}, expected {expected}", label(.node))]
    TypeMismatch {
        node: Option<NodeId>,
        attr: Attr,
        expected: &'static str,
        found: String,
    },

    #[error("{node}.{attr:?} would hold {count} values but allows one")]
    Cardinality {
        node: NodeId,
        attr: Attr,
        count: usize,
    },

    #[error("grouped row has no subject")]
    GroupedRow,

    #[error("unrecognized {what} {value:?}")]
    UnknownLiteral { what: &'static str, value: String },

    #[error("snapshot {path}: {source}")]
    SnapshotIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot encoding: {0}")]
    SnapshotFormat(#[from] serde_json::Error),
}

fn label(node: &Option<NodeId>) -> String {
    node.map_or_else(|| "group".to_string(), |n| n.to_string())
}

/// Failures that abort a simulation run.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("graph store: {0}")]
    Store(#[from] StoreError),

    #[error("inconsistent records: {0}")]
    Inconsistent(String),

    #[error("step count must be non-negative, got {0}")]
    NegativeSteps(i64),

    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),
}
