//! Typed repositories over the graph store.
//!
//! Each record kind gets a trait with the reads and writes the simulation
//! needs. [`Repository`] implements all of them on top of one [`GraphStore`],
//! translating typed calls into [`Query`](crate::graph::Query) patterns and
//! [`Delta`](crate::graph::Delta) change sets.

use crate::error::StoreError;
use crate::graph::GraphStore;
use crate::ids::{FamilyId, PersonId, ResourceId};
use crate::types::{CalorieEmergency, Person, Profession, ProfessionCounts, Resource};

mod emergency;
mod family;
mod person;
mod resource;

pub trait PersonRepository {
    fn person(&self, id: PersonId) -> Result<Person, StoreError>;

    fn living(&self) -> Result<Vec<Person>, StoreError>;

    /// Living members of `family`.
    fn family_members(&self, family: FamilyId) -> Result<Vec<Person>, StoreError>;

    /// Every child recorded with `mother` as its mother, living or dead.
    fn children_of(&self, mother: PersonId) -> Result<Vec<Person>, StoreError>;

    /// Living, unpartnered persons strictly older than `min_age` days.
    fn unpartnered_adults(&self, min_age: u32) -> Result<Vec<Person>, StoreError>;

    fn first_names(&self) -> Result<Vec<String>, StoreError>;

    /// Insert a new person, linking it as a child of its recorded parents.
    fn create_person(&mut self, person: &Person) -> Result<(), StoreError>;

    /// Record `child` as a child of `parent`, on both sides of the relation.
    fn link_child(&mut self, parent: &Person, child: PersonId) -> Result<(), StoreError>;

    fn set_profession(&mut self, id: PersonId, profession: Profession) -> Result<(), StoreError>;

    /// Store a new health value, clamped to [0, 100].
    fn set_health(&mut self, id: PersonId, health: i32) -> Result<(), StoreError>;

    /// Mark a person dead with zero health.
    fn kill(&mut self, id: PersonId) -> Result<(), StoreError>;

    /// Record a symmetric partnership.
    fn partner(&mut self, a: PersonId, b: PersonId) -> Result<(), StoreError>;

    /// Add one day to every living person's age; returns how many aged.
    fn age_all_living(&mut self) -> Result<usize, StoreError>;
}

pub trait FamilyRepository {
    fn families(&self) -> Result<Vec<FamilyId>, StoreError>;

    fn create_family(&mut self, id: FamilyId) -> Result<(), StoreError>;

    /// Living members of `family` per occupation.
    fn profession_counts(&self, family: FamilyId) -> Result<ProfessionCounts, StoreError>;
}

pub trait ResourceRepository {
    fn resources(&self, family: FamilyId) -> Result<Vec<Resource>, StoreError>;

    fn create_resource(&mut self, resource: &Resource) -> Result<(), StoreError>;

    fn set_quantity(&mut self, resource: ResourceId, quantity: u32) -> Result<(), StoreError>;

    /// Replace the quantity of several resources in one change set.
    fn set_quantities(&mut self, updates: &[Resource]) -> Result<(), StoreError>;
}

pub trait EmergencyRepository {
    fn active_emergency(&self, family: FamilyId) -> Result<Option<CalorieEmergency>, StoreError>;

    /// Every active emergency, in identifier order.
    fn emergencies(&self) -> Result<Vec<CalorieEmergency>, StoreError>;

    fn families_in_emergency(&self) -> Result<Vec<FamilyId>, StoreError>;

    fn open_emergency(&mut self, emergency: &CalorieEmergency) -> Result<(), StoreError>;

    fn remove_emergency(&mut self, emergency: &CalorieEmergency) -> Result<(), StoreError>;
}

/// All repositories, backed by a single graph store.
#[derive(Debug, Clone, Default)]
pub struct Repository<S> {
    store: S,
}

impl<S: GraphStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}
