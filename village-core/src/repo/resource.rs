use super::{Repository, ResourceRepository};
use crate::error::StoreError;
use crate::graph::{Attr, Delta, Filter, GraphStore, Query, RecordKind, Row};
use crate::ids::{FamilyId, ResourceId};
use crate::types::{Resource, ResourceKind};

impl TryFrom<&Row> for Resource {
    type Error = StoreError;

    fn try_from(row: &Row) -> Result<Self, StoreError> {
        let quantity = row.int(Attr::Quantity)?;
        Ok(Resource {
            id: ResourceId::from_node(row.subject()?)?,
            family: FamilyId::from_node(row.node(Attr::Family)?)?,
            kind: ResourceKind::from_name(row.text(Attr::Name)?)?,
            quantity: u32::try_from(quantity).map_err(|_| StoreError::TypeMismatch {
                node: row.subject,
                attr: Attr::Quantity,
                expected: "non-negative int",
                found: quantity.to_string(),
            })?,
        })
    }
}

impl<S: GraphStore> ResourceRepository for Repository<S> {
    fn resources(&self, family: FamilyId) -> Result<Vec<Resource>, StoreError> {
        self.store
            .query(
                &Query::of(RecordKind::Resource)
                    .select_all(&[Attr::Family, Attr::Name, Attr::Quantity])
                    .filter(Filter::eq(Attr::Family, family.node())),
            )?
            .iter()
            .map(Resource::try_from)
            .collect()
    }

    fn create_resource(&mut self, r: &Resource) -> Result<(), StoreError> {
        self.store.apply_delta(
            &Delta::new()
                .create(r.id)
                .insert(r.id, Attr::Family, r.family.node())
                .insert(r.id, Attr::Name, r.kind.name())
                .insert(r.id, Attr::Quantity, r.quantity)
                .insert(r.family, Attr::Resource, r.id.node()),
        )
    }

    fn set_quantity(&mut self, resource: ResourceId, quantity: u32) -> Result<(), StoreError> {
        self.store
            .apply_delta(&Delta::new().set(resource, Attr::Quantity, quantity))
    }

    fn set_quantities(&mut self, updates: &[Resource]) -> Result<(), StoreError> {
        let delta = updates.iter().fold(Delta::new(), |delta, r| {
            delta.set(r.id, Attr::Quantity, r.quantity)
        });
        if delta.is_empty() {
            return Ok(());
        }
        self.store.apply_delta(&delta)
    }
}
