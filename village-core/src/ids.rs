//! Record identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::graph::{NodeId, RecordKind};

macro_rules! record_id {
    ($name:ident, $kind:expr) => {
        #[derive(
            Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
        )]
        pub struct $name(pub u32);

        impl $name {
            pub fn new(id: u32) -> Self {
                Self(id)
            }

            pub fn node(self) -> NodeId {
                NodeId::new($kind, self.0)
            }

            /// Narrow a graph node to this id, failing on a node of another kind.
            pub fn from_node(node: NodeId) -> Result<Self, StoreError> {
                if node.kind == $kind {
                    Ok(Self(node.index))
                } else {
                    Err(StoreError::WrongKind {
                        node,
                        expected: $kind,
                    })
                }
            }
        }

        impl From<$name> for NodeId {
            fn from(id: $name) -> NodeId {
                id.node()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.node().fmt(f)
            }
        }
    };
}

record_id!(PersonId, RecordKind::Person);
record_id!(FamilyId, RecordKind::Family);
record_id!(ResourceId, RecordKind::Resource);
record_id!(EmergencyId, RecordKind::Emergency);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_nodes() {
        let node = PersonId::new(12).node();
        assert_eq!(node.to_string(), "person/12");
        assert_eq!(PersonId::from_node(node).unwrap(), PersonId(12));
    }

    #[test]
    fn narrowing_rejects_other_kinds() {
        let node = FamilyId::new(3).node();
        assert!(matches!(
            PersonId::from_node(node),
            Err(StoreError::WrongKind { .. })
        ));
    }
}
