use super::{FamilyRepository, Repository};
use crate::error::StoreError;
use crate::graph::{Attr, Delta, Filter, GraphStore, Query, RecordKind};
use crate::ids::FamilyId;
use crate::types::{Profession, ProfessionCounts};

impl<S: GraphStore> FamilyRepository for Repository<S> {
    fn families(&self) -> Result<Vec<FamilyId>, StoreError> {
        self.store
            .query(&Query::of(RecordKind::Family))?
            .iter()
            .map(|row| FamilyId::from_node(row.subject()?))
            .collect()
    }

    fn create_family(&mut self, id: FamilyId) -> Result<(), StoreError> {
        self.store.apply_delta(&Delta::new().create(id))
    }

    fn profession_counts(&self, family: FamilyId) -> Result<ProfessionCounts, StoreError> {
        let groups = self.store.query(
            &Query::of(RecordKind::Person)
                .filter(Filter::eq(Attr::Alive, true))
                .filter(Filter::eq(Attr::Family, family.node()))
                .group_count(Attr::Profession),
        )?;

        let mut counts = ProfessionCounts::default();
        for group in &groups {
            let n = group.count as u32;
            match Profession::from_name(group.text(Attr::Profession)?)? {
                Profession::Farmer => counts.farmers += n,
                Profession::Fisher => counts.fishers += n,
                Profession::Forager => counts.foragers += n,
                Profession::None => {}
            }
        }
        Ok(counts)
    }
}
