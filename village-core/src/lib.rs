//! Day-by-day simulation of a village organized into families.
//!
//! The population lives in a labeled-graph store behind [`GraphStore`]; the
//! [`Engine`] reads it through typed repositories, applies the daily rules
//! and writes the results back.

pub mod allocator;
pub mod config;
pub mod demography;
pub mod economy;
pub mod emergency;
pub mod engine;
pub mod error;
pub mod graph;
pub mod ids;
pub mod mortality;
pub mod repo;
pub mod seed;
pub mod types;

#[cfg(feature = "instrument")]
pub use instrument;

pub use allocator::IdAllocator;
pub use config::SimConfig;
pub use economy::{Demand, Settlement, Stores};
pub use engine::{DayReport, Engine};
pub use error::{ConfigError, SimError, StoreError};
pub use graph::{Attr, Delta, Filter, GraphStore, MemoryGraph, NodeId, Query, RecordKind, Row, Value};
pub use ids::{EmergencyId, FamilyId, PersonId, ResourceId};
pub use repo::{
    EmergencyRepository, FamilyRepository, PersonRepository, Repository, ResourceRepository,
};
pub use seed::{PersonSeed, Seeder};
pub use types::{
    CalorieEmergency, Gender, Person, Profession, ProfessionCounts, Resource, ResourceKind,
};
