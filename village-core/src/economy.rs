//! Family food economy.
//!
//! Each day a family's stores grow by what its workers bring in, then the
//! family eats. Supply and demand are compared in calories: stores convert at
//! fixed rates per unit, and each member needs a daily ration from the
//! age/gender table scaled by [`DEMAND_SCALE`].
//!
//! On a surplus day the family eats garden and coastal food first, then fish
//! from the freshest stage down. Plant food and the fresh catch do not keep:
//! both are gone by evening. Uneaten secondary fish ages into tertiary as
//! whole units, and the old tertiary stock spoils.

use std::ops::Range;

use crate::ids::PersonId;
use crate::types::{Gender, Person, ProfessionCounts, Resource, ResourceKind};

// === CONSTANTS ===

pub const GARDEN_YIELD_PER_FARMER: u32 = 9;
pub const MARINE_YIELD_PER_FISHER: u32 = 9;
/// Per-forager coastal yield, drawn once per family per day.
pub const COASTAL_YIELD: Range<u32> = 1..5;

pub const MARINE_CALORIES: u64 = 3000;
pub const GARDEN_CALORIES: u64 = 250;
pub const COASTAL_CALORIES: u64 = 10;

/// Demand is tabulated in ration units; one unit is this many calories.
pub const DEMAND_SCALE: u64 = 100;

/// Daily ration by age band (days, inclusive): (from, to, male, female).
const RATIONS: [(u32, u32, u32, u32); 5] = [
    (730, 1825, 12, 12),
    (2190, 3285, 20, 18),
    (3650, 5110, 25, 22),
    (5475, 12775, 30, 24),
    (13140, 25550, 27, 22),
];

/// Daily ration for one person, or `None` when the age falls between or
/// beyond the tabulated bands.
pub fn daily_ration(age: u32, gender: Gender) -> Option<u32> {
    RATIONS
        .iter()
        .find(|(from, to, _, _)| (*from..=*to).contains(&age))
        .map(|&(_, _, male, female)| match gender {
            Gender::Male => male,
            Gender::Female => female,
        })
}

/// Ration units a family needs today.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Demand {
    pub units: u64,
    /// Members with no tabulated ration; they count as zero.
    pub unrated: Vec<PersonId>,
}

impl Demand {
    pub fn of(members: &[Person]) -> Self {
        let mut demand = Demand::default();
        for person in members.iter().filter(|p| p.alive) {
            match daily_ration(person.age, person.gender) {
                Some(units) => demand.units += u64::from(units),
                None => {
                    tracing::warn!(
                        target: "policy_gap",
                        person_id = person.id.0,
                        family_id = person.family.0,
                        age = person.age,
                        gender = person.gender.code(),
                        "no ration for age/gender"
                    );
                    demand.unrated.push(person.id);
                }
            }
        }
        demand
    }

    pub fn calories(&self) -> u64 {
        self.units * DEMAND_SCALE
    }
}

// === STORES ===

/// Quantities of the five resource kinds held by one family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stores {
    pub garden: u32,
    pub coastal: u32,
    pub primary: u32,
    pub secondary: u32,
    pub tertiary: u32,
}

impl Stores {
    /// Collect quantities by kind; kinds without a record hold nothing.
    pub fn from_resources(resources: &[Resource]) -> Self {
        let mut stores = Stores::default();
        for r in resources {
            stores.set(r.kind, r.quantity);
        }
        stores
    }

    pub fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Garden => self.garden,
            ResourceKind::Coastal => self.coastal,
            ResourceKind::PrimaryMarine => self.primary,
            ResourceKind::SecondaryMarine => self.secondary,
            ResourceKind::TertiaryMarine => self.tertiary,
        }
    }

    pub fn set(&mut self, kind: ResourceKind, quantity: u32) {
        let slot = match kind {
            ResourceKind::Garden => &mut self.garden,
            ResourceKind::Coastal => &mut self.coastal,
            ResourceKind::PrimaryMarine => &mut self.primary,
            ResourceKind::SecondaryMarine => &mut self.secondary,
            ResourceKind::TertiaryMarine => &mut self.tertiary,
        };
        *slot = quantity;
    }

    /// Add one day of work. `coastal_draw` is the per-forager yield for today.
    pub fn produce(&mut self, workers: ProfessionCounts, coastal_draw: u32) {
        self.garden = self
            .garden
            .saturating_add(workers.farmers.saturating_mul(GARDEN_YIELD_PER_FARMER));
        self.coastal = self
            .coastal
            .saturating_add(workers.foragers.saturating_mul(coastal_draw));
        self.primary = self
            .primary
            .saturating_add(workers.fishers.saturating_mul(MARINE_YIELD_PER_FISHER));
    }

    fn marine(quantity: u32) -> u64 {
        u64::from(quantity) * MARINE_CALORIES
    }

    pub fn calories(&self) -> u64 {
        Self::marine(self.primary)
            + Self::marine(self.secondary)
            + Self::marine(self.tertiary)
            + u64::from(self.garden) * GARDEN_CALORIES
            + u64::from(self.coastal) * COASTAL_CALORIES
    }

    fn clear(&mut self) {
        *self = Stores::default();
    }

    /// Eat `need` calories, given that the stores hold at least that much.
    fn consume(&mut self, need: u64) {
        let plant = u64::from(self.garden) * GARDEN_CALORIES
            + u64::from(self.coastal) * COASTAL_CALORIES;
        let unmet = need
            .saturating_sub(plant)
            .saturating_sub(Self::marine(self.primary));
        let secondary = Self::marine(self.secondary);

        // Whatever secondary fish is left over ages one stage.
        let tertiary = if unmet > secondary {
            0
        } else {
            (secondary - unmet) / MARINE_CALORIES
        };

        *self = Stores {
            tertiary: clamp_units(tertiary),
            ..Stores::default()
        };
    }
}

fn clamp_units(units: u64) -> u32 {
    u32::try_from(units).unwrap_or(u32::MAX)
}

// === SETTLEMENT ===

/// How a family's day resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Settlement {
    /// Nobody needed food; stores carry over untouched.
    Skipped,
    /// Supply covered demand.
    Surplus,
    /// Supply fell short; `ratio` is supply over demand, in [0, 1).
    Deficit { ratio: f64 },
}

impl Settlement {
    pub fn label(&self) -> &'static str {
        match self {
            Settlement::Skipped => "skipped",
            Settlement::Surplus => "surplus",
            Settlement::Deficit { .. } => "deficit",
        }
    }
}

/// Feed a family from its stores.
///
/// A deficit empties every store. A family with zero demand keeps its stores
/// as they are, which also keeps the ratio away from a zero divisor.
pub fn settle(stores: &mut Stores, demand: &Demand) -> Settlement {
    let need = demand.calories();
    if need == 0 {
        return Settlement::Skipped;
    }

    let supply = stores.calories();
    if supply < need {
        stores.clear();
        return Settlement::Deficit {
            ratio: supply as f64 / need as f64,
        };
    }

    stores.consume(need);
    Settlement::Surplus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::FamilyId;
    use crate::types::Profession;

    fn member(id: u32, gender: Gender, age: u32) -> Person {
        Person {
            id: PersonId(id),
            gender,
            age,
            alive: true,
            health: 100,
            profession: Profession::None,
            family: FamilyId(1),
            partner: None,
            mother: None,
            father: None,
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    fn demand(units: u64) -> Demand {
        Demand {
            units,
            unrated: Vec::new(),
        }
    }

    #[test]
    fn ration_table_bands() {
        assert_eq!(daily_ration(730, Gender::Male), Some(12));
        assert_eq!(daily_ration(1825, Gender::Female), Some(12));
        assert_eq!(daily_ration(3000, Gender::Female), Some(18));
        assert_eq!(daily_ration(5000, Gender::Male), Some(25));
        assert_eq!(daily_ration(8000, Gender::Female), Some(24));
        assert_eq!(daily_ration(25550, Gender::Male), Some(27));

        // Gaps between bands and the ends of the table
        assert_eq!(daily_ration(100, Gender::Male), None);
        assert_eq!(daily_ration(2000, Gender::Female), None);
        assert_eq!(daily_ration(30000, Gender::Male), None);
    }

    #[test]
    fn demand_counts_only_the_living_and_flags_gaps() {
        let mut dead = member(3, Gender::Male, 8000);
        dead.alive = false;
        let members = vec![
            member(1, Gender::Male, 8000),
            member(2, Gender::Female, 2000),
            dead,
        ];
        let d = Demand::of(&members);
        assert_eq!(d.units, 30);
        assert_eq!(d.unrated, vec![PersonId(2)]);
        assert_eq!(d.calories(), 3000);
    }

    #[test]
    fn production_by_profession() {
        let mut stores = Stores {
            garden: 1,
            secondary: 4,
            ..Stores::default()
        };
        let workers = ProfessionCounts {
            farmers: 2,
            fishers: 1,
            foragers: 3,
        };
        stores.produce(workers, 4);
        assert_eq!(
            stores,
            Stores {
                garden: 19,
                coastal: 12,
                primary: 9,
                secondary: 4,
                tertiary: 0,
            }
        );
    }

    #[test]
    fn single_farmer_surplus() {
        let mut stores = Stores::default();
        stores.produce(
            ProfessionCounts {
                farmers: 1,
                ..ProfessionCounts::default()
            },
            1,
        );
        assert_eq!(stores.calories(), 2250);

        // A toddler's 12 units fit under the 2250 calories of one garden day
        let outcome = settle(&mut stores, &demand(12));
        assert_eq!(outcome, Settlement::Surplus);
        assert_eq!(stores, Stores::default());
    }

    #[test]
    fn zero_demand_leaves_stores_alone() {
        let mut stores = Stores {
            garden: 5,
            tertiary: 2,
            ..Stores::default()
        };
        assert_eq!(settle(&mut stores, &demand(0)), Settlement::Skipped);
        assert_eq!(stores.garden, 5);
        assert_eq!(stores.tertiary, 2);
    }

    #[test]
    fn deficit_empties_everything() {
        let mut stores = Stores {
            garden: 4,
            coastal: 10,
            ..Stores::default()
        };
        // 1000 + 100 calories against 2000
        let outcome = settle(&mut stores, &demand(20));
        assert_eq!(outcome, Settlement::Deficit { ratio: 0.55 });
        assert_eq!(stores, Stores::default());
    }

    #[test]
    fn plant_surplus_does_not_become_fish() {
        // 100 garden and 50 coastal are 25500 calories against 2400.
        let mut stores = Stores {
            garden: 100,
            coastal: 50,
            ..Stores::default()
        };
        assert_eq!(settle(&mut stores, &demand(24)), Settlement::Surplus);
        assert_eq!(stores, Stores::default());
    }

    #[test]
    fn need_met_by_primary_ages_secondary() {
        // Plants give 1100 of 5000; primary covers the other 3900 with fish
        // to spare. Secondary is untouched and ages whole; old tertiary spoils.
        let mut stores = Stores {
            garden: 4,
            coastal: 10,
            primary: 3,
            secondary: 2,
            tertiary: 7,
        };
        assert_eq!(settle(&mut stores, &demand(50)), Settlement::Surplus);
        assert_eq!(
            stores,
            Stores {
                tertiary: 2,
                ..Stores::default()
            }
        );
    }

    #[test]
    fn secondary_covers_remaining_need() {
        // Plants 1100 + primary 3000 leave 3900 of 8000 for secondary's 9000.
        // 5100 calories remain, which is one whole fish.
        let mut stores = Stores {
            garden: 4,
            coastal: 10,
            primary: 1,
            secondary: 3,
            tertiary: 1,
        };
        assert_eq!(settle(&mut stores, &demand(80)), Settlement::Surplus);
        assert_eq!(
            stores,
            Stores {
                tertiary: 1,
                ..Stores::default()
            }
        );
    }

    #[test]
    fn tertiary_needed_clears_all_fish() {
        // Plants 1100 + secondary 3000 fall short of 6000; tertiary is drawn on.
        let mut stores = Stores {
            garden: 4,
            coastal: 10,
            secondary: 1,
            tertiary: 5,
            ..Stores::default()
        };
        assert_eq!(settle(&mut stores, &demand(60)), Settlement::Surplus);
        assert_eq!(stores, Stores::default());
    }
}
