use super::{EmergencyRepository, Repository};
use crate::error::StoreError;
use crate::graph::{Attr, Delta, Filter, GraphStore, Query, RecordKind, Row};
use crate::ids::{EmergencyId, FamilyId};
use crate::types::CalorieEmergency;

fn active_emergencies() -> Query {
    Query::of(RecordKind::Emergency)
        .select_all(&[Attr::Family, Attr::Active, Attr::StartDate])
        .filter(Filter::eq(Attr::Active, true))
}

impl TryFrom<&Row> for CalorieEmergency {
    type Error = StoreError;

    fn try_from(row: &Row) -> Result<Self, StoreError> {
        let start = row.int(Attr::StartDate)?;
        Ok(CalorieEmergency {
            id: EmergencyId::from_node(row.subject()?)?,
            family: FamilyId::from_node(row.node(Attr::Family)?)?,
            active: row.bool(Attr::Active)?,
            start_day: u32::try_from(start).map_err(|_| StoreError::TypeMismatch {
                node: row.subject,
                attr: Attr::StartDate,
                expected: "non-negative int",
                found: start.to_string(),
            })?,
        })
    }
}

impl<S: GraphStore> EmergencyRepository for Repository<S> {
    fn active_emergency(&self, family: FamilyId) -> Result<Option<CalorieEmergency>, StoreError> {
        let rows = self
            .store
            .query(&active_emergencies().filter(Filter::eq(Attr::Family, family.node())))?;
        match rows.as_slice() {
            [] => Ok(None),
            [row] => CalorieEmergency::try_from(row).map(Some),
            _ => Err(StoreError::Cardinality {
                node: family.node(),
                attr: Attr::Emergency,
                count: rows.len(),
            }),
        }
    }

    fn emergencies(&self) -> Result<Vec<CalorieEmergency>, StoreError> {
        self.store
            .query(&active_emergencies())?
            .iter()
            .map(CalorieEmergency::try_from)
            .collect()
    }

    fn families_in_emergency(&self) -> Result<Vec<FamilyId>, StoreError> {
        let mut families: Vec<FamilyId> =
            self.emergencies()?.into_iter().map(|e| e.family).collect();
        families.sort();
        families.dedup();
        Ok(families)
    }

    fn open_emergency(&mut self, e: &CalorieEmergency) -> Result<(), StoreError> {
        // Family.Emergency is single-valued, so a second open on the same
        // family fails as a cardinality error and nothing is written.
        self.store.apply_delta(
            &Delta::new()
                .create(e.id)
                .insert(e.id, Attr::Family, e.family.node())
                .insert(e.id, Attr::Active, e.active)
                .insert(e.id, Attr::StartDate, e.start_day)
                .insert(e.family, Attr::Emergency, e.id.node()),
        )
    }

    fn remove_emergency(&mut self, e: &CalorieEmergency) -> Result<(), StoreError> {
        self.store.apply_delta(
            &Delta::new()
                .delete(e.id)
                .remove_value(e.family, Attr::Emergency, e.id.node()),
        )
    }
}
