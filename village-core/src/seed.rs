//! Programmatic population setup.
//!
//! ```
//! use village_core::{Gender, MemoryGraph, PersonSeed, Profession, Seeder, Stores};
//!
//! let mut seeder = Seeder::new(MemoryGraph::new()).unwrap();
//! let family = seeder.family(Stores { garden: 3, ..Stores::default() }).unwrap();
//! let ixchel = seeder
//!     .person(family, PersonSeed::new(Gender::Female, 7000).profession(Profession::Farmer))
//!     .unwrap();
//! let store = seeder.finish();
//! ```

use crate::allocator::IdAllocator;
use crate::economy::Stores;
use crate::error::StoreError;
use crate::graph::GraphStore;
use crate::ids::{FamilyId, PersonId};
use crate::mortality::MAX_HEALTH;
use crate::repo::{FamilyRepository, PersonRepository, Repository, ResourceRepository};
use crate::types::{Gender, Person, Profession, Resource, ResourceKind};

/// Attributes for one seeded person. Unset names are derived from identifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonSeed {
    pub gender: Gender,
    pub age: u32,
    pub health: i32,
    pub profession: Profession,
    pub alive: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl PersonSeed {
    pub fn new(gender: Gender, age: u32) -> Self {
        Self {
            gender,
            age,
            health: MAX_HEALTH,
            profession: Profession::None,
            alive: true,
            first_name: None,
            last_name: None,
        }
    }

    pub fn health(mut self, health: i32) -> Self {
        self.health = health;
        self
    }

    pub fn profession(mut self, profession: Profession) -> Self {
        self.profession = profession;
        self
    }

    pub fn dead(mut self) -> Self {
        self.alive = false;
        self.health = 0;
        self
    }

    pub fn named(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }
}

/// Writes an initial population into a store, minting ids as it goes.
pub struct Seeder<S> {
    repo: Repository<S>,
    ids: IdAllocator,
}

impl<S: GraphStore> Seeder<S> {
    /// Seeding continues after any records already in `store`.
    pub fn new(store: S) -> Result<Self, StoreError> {
        let ids = IdAllocator::resume(&store)?;
        Ok(Self {
            repo: Repository::new(store),
            ids,
        })
    }

    /// A new family holding one record per resource kind.
    pub fn family(&mut self, stores: Stores) -> Result<FamilyId, StoreError> {
        let family = self.ids.family();
        self.repo.create_family(family)?;
        for kind in ResourceKind::all() {
            self.repo.create_resource(&Resource {
                id: self.ids.resource(),
                family,
                kind,
                quantity: stores.get(kind),
            })?;
        }
        Ok(family)
    }

    pub fn person(&mut self, family: FamilyId, seed: PersonSeed) -> Result<PersonId, StoreError> {
        let id = self.ids.person();
        self.repo.create_person(&Person {
            id,
            gender: seed.gender,
            age: seed.age,
            alive: seed.alive,
            health: seed.health,
            profession: seed.profession,
            family,
            partner: None,
            mother: None,
            father: None,
            first_name: seed.first_name.unwrap_or_else(|| format!("Winik{}", id.0)),
            last_name: seed.last_name.unwrap_or_else(|| format!("Family{}", family.0)),
        })?;
        Ok(id)
    }

    pub fn partner(&mut self, a: PersonId, b: PersonId) -> Result<(), StoreError> {
        self.repo.partner(a, b)
    }

    /// Record `child` as a child of `parent`.
    pub fn parent(&mut self, parent: PersonId, child: PersonId) -> Result<(), StoreError> {
        let parent = self.repo.person(parent)?;
        self.repo.link_child(&parent, child)
    }

    pub fn finish(self) -> S {
        self.repo.into_inner()
    }
}
