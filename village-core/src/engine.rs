//! The daily simulation loop.
//!
//! Day phases:
//! 0. Snapshot - export the graph as it stood before the day
//! 1. Aging - every living person gets one day older
//! 2. Partnering - match free adults across families
//! 3. Families, in id order:
//!    emergency expiry → production and eating → health → occupation → births
//! 4. Id marks - record the allocator's counters in the store
//!
//! Each write goes to the store as its own change set. A failing write
//! aborts the day where it stands; the day's snapshot is the point to
//! restart from.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::allocator::IdAllocator;
use crate::config::SimConfig;
use crate::demography::{self, Birth, NameGenerator, occupation, partnering};
use crate::economy::{self, COASTAL_YIELD, Demand, Settlement, Stores};
use crate::emergency;
use crate::error::{SimError, StoreError};
use crate::graph::{Attr, Filter, GraphStore, Query, RecordKind};
use crate::ids::{FamilyId, PersonId};
use crate::mortality::{self, HealthOutcome};
use crate::repo::{
    EmergencyRepository, FamilyRepository, PersonRepository, Repository, ResourceRepository,
};
use crate::types::{CalorieEmergency, Resource, ResourceKind};

/// What happened on one simulated day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayReport {
    pub day: u32,
    pub living: usize,
    pub dead: usize,
    pub partnerships: usize,
    pub births: Vec<Birth>,
    pub deaths: Vec<PersonId>,
    pub emergencies_opened: Vec<CalorieEmergency>,
    pub emergencies_expired: Vec<CalorieEmergency>,
    pub families_in_emergency: usize,
}

pub struct Engine<S> {
    repo: Repository<S>,
    ids: IdAllocator,
    names: NameGenerator,
    rng: StdRng,
    config: SimConfig,
    day: u32,
}

impl<S: GraphStore> Engine<S> {
    /// Build an engine over a populated store. Identifiers continue after
    /// every one the store has recorded or still holds.
    pub fn new(store: S, config: SimConfig) -> Result<Self, SimError> {
        let repo = Repository::new(store);
        let ids = IdAllocator::resume(repo.store())?;
        let names = NameGenerator::new(repo.first_names()?);
        Ok(Self {
            repo,
            ids,
            names,
            rng: StdRng::seed_from_u64(config.seed),
            config,
            day: 0,
        })
    }

    /// Build an engine with settings read from a TOML file.
    pub fn from_config_file(store: S, path: &Path) -> Result<Self, SimError> {
        let config = SimConfig::load(path)?;
        Self::new(store, config)
    }

    /// Index of the last completed day; 0 before the first step.
    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn repo(&self) -> &Repository<S> {
        &self.repo
    }

    pub fn store(&self) -> &S {
        self.repo.store()
    }

    pub fn into_store(self) -> S {
        self.repo.into_inner()
    }

    /// Run `steps` consecutive days.
    pub fn run(&mut self, steps: i64) -> Result<(), SimError> {
        if steps < 0 {
            return Err(SimError::NegativeSteps(steps));
        }
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    /// Run one day.
    pub fn step(&mut self) -> Result<DayReport, SimError> {
        self.day += 1;
        let day = self.day;
        let mut report = DayReport {
            day,
            ..DayReport::default()
        };

        // === 0. SNAPSHOT ===
        if let Some(path) = self.snapshot_path(day) {
            self.repo.store().export_snapshot(&path)?;
        }

        // === 1. AGING ===
        demography::age_population(&mut self.repo)?;

        // === 2. PARTNERING ===
        if self.config.partnering {
            report.partnerships = partnering::match_partners(&mut self.repo, day)?.len();
        }

        // === 3. FAMILIES ===
        for family in self.repo.families()? {
            self.family_day(family, &mut report)?;
        }

        report.living = self.repo.living()?.len();
        report.dead = self
            .repo
            .store()
            .query(&Query::of(RecordKind::Person).filter(Filter::eq(Attr::Alive, false)))?
            .len();
        report.families_in_emergency = self.repo.families_in_emergency()?.len();

        // === 4. ID MARKS ===
        self.ids.save(self.repo.store_mut())?;

        tracing::info!(
            target: "day",
            day = day,
            living = report.living,
            dead = report.dead,
            births = report.births.len(),
            deaths = report.deaths.len(),
            families_in_emergency = report.families_in_emergency,
        );
        Ok(report)
    }

    fn snapshot_path(&self, day: u32) -> Option<PathBuf> {
        self.config
            .snapshot_dir
            .as_ref()
            .map(|dir| dir.join(format!("graph_{day}.json")))
    }

    fn family_day(&mut self, family: FamilyId, report: &mut DayReport) -> Result<(), SimError> {
        let day = self.day;

        // Emergency check
        if let Some(expired) =
            emergency::expire_if_due(&mut self.repo, family, day, self.config.emergency_limit_days)?
        {
            report.emergencies_expired.push(expired);
        }

        // Production and eating
        let workers = self.repo.profession_counts(family)?;
        let coastal_draw = self.rng.random_range(COASTAL_YIELD);
        let held = self.repo.resources(family)?;
        let mut stores = Stores::from_resources(&held);
        stores.produce(workers, coastal_draw);
        let supply = stores.calories();

        let members = self.repo.family_members(family)?;
        let demand = Demand::of(&members);
        let outcome = economy::settle(&mut stores, &demand);
        self.write_stores(family, &held, stores)?;

        tracing::info!(
            target: "family_day",
            day = day,
            family_id = family.0,
            farmers = workers.farmers,
            fishers = workers.fishers,
            foragers = workers.foragers,
            supply = supply,
            demand = demand.calories(),
            outcome = outcome.label(),
            garden = stores.garden,
            coastal = stores.coastal,
            primary_marine = stores.primary,
            secondary_marine = stores.secondary,
            tertiary_marine = stores.tertiary,
        );

        // Health
        match outcome {
            Settlement::Skipped => {}
            Settlement::Surplus => {
                for person in &members {
                    if let Some(health) = mortality::after_surplus(person.health) {
                        self.repo.set_health(person.id, health)?;
                    }
                }
            }
            Settlement::Deficit { ratio } => {
                let loss = mortality::deficit_loss(ratio);
                for person in members.iter().filter(|p| p.health > 0) {
                    match mortality::after_deficit(person.health, loss) {
                        HealthOutcome::Survives { health } => {
                            self.repo.set_health(person.id, health)?;
                        }
                        HealthOutcome::Dies => {
                            self.repo.kill(person.id)?;
                            tracing::info!(
                                target: "death",
                                day = day,
                                person_id = person.id.0,
                                family_id = family.0,
                                age = person.age,
                            );
                            report.deaths.push(person.id);
                        }
                    }
                }
                let survivors = self.repo.family_members(family)?;
                if let Some(opened) =
                    emergency::open_if_critical(&mut self.repo, &mut self.ids, family, &survivors, day)?
                {
                    report.emergencies_opened.push(opened);
                }
            }
        }

        // Occupation
        let members = self.repo.family_members(family)?;
        let in_emergency = self.repo.active_emergency(family)?.is_some();
        occupation::reassign(&mut self.repo, &members, in_emergency, day)?;

        // Births
        let births = demography::evaluate_births(
            &mut self.repo,
            &mut self.ids,
            &mut self.names,
            &mut self.rng,
            &members,
            day,
        )?;
        report.births.extend(births);
        Ok(())
    }

    /// Persist the family's new stock levels, touching only what changed.
    fn write_stores(
        &mut self,
        family: FamilyId,
        held: &[Resource],
        stores: Stores,
    ) -> Result<(), StoreError> {
        let mut updates = Vec::new();
        for kind in ResourceKind::all() {
            let quantity = stores.get(kind);
            match held.iter().find(|r| r.kind == kind) {
                Some(r) if r.quantity != quantity => updates.push(Resource { quantity, ..*r }),
                Some(_) => {}
                None if quantity > 0 => self.repo.create_resource(&Resource {
                    id: self.ids.resource(),
                    family,
                    kind,
                    quantity,
                })?,
                None => {}
            }
        }
        self.repo.set_quantities(&updates)
    }
}
