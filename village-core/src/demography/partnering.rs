//! Partner matching.
//!
//! Eligible pairs are alive, unpartnered adults of opposite gender from
//! different families whose ages are close. Matching is greedy on age
//! proximity: every eligible (female, male) pair is ranked by age gap, ties
//! broken by female then male identifier, and pairs are taken in that order
//! while both sides are still free. The result depends only on the
//! candidates, so a run is reproducible.

use std::collections::HashSet;

use crate::error::StoreError;
use crate::ids::PersonId;
use crate::repo::PersonRepository;
use crate::types::{Gender, Person};

/// Partners must be strictly older than this many days.
pub const MIN_PARTNER_AGE: u32 = 5844;
/// Age gaps must be strictly smaller than this many days.
pub const MAX_AGE_GAP: u32 = 1460;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing {
    pub female: PersonId,
    pub male: PersonId,
    pub age_gap: u32,
}

fn available(p: &Person) -> bool {
    p.alive && p.partner.is_none() && p.age > MIN_PARTNER_AGE
}

pub fn compatible(female: &Person, male: &Person) -> bool {
    available(female)
        && available(male)
        && female.gender == Gender::Female
        && male.gender == Gender::Male
        && female.family != male.family
        && female.age.abs_diff(male.age) < MAX_AGE_GAP
}

/// Choose pairs among `candidates` without touching the store.
pub fn plan(candidates: &[Person]) -> Vec<Pairing> {
    let (females, males): (Vec<&Person>, Vec<&Person>) = candidates
        .iter()
        .partition(|p| p.gender == Gender::Female);

    let mut options: Vec<Pairing> = females
        .iter()
        .flat_map(|f| males.iter().map(move |m| (*f, *m)))
        .filter(|(f, m)| compatible(f, m))
        .map(|(f, m)| Pairing {
            female: f.id,
            male: m.id,
            age_gap: f.age.abs_diff(m.age),
        })
        .collect();
    options.sort_by_key(|p| (p.age_gap, p.female, p.male));

    let mut taken: HashSet<PersonId> = HashSet::new();
    options
        .into_iter()
        .filter(|p| {
            if taken.contains(&p.female) || taken.contains(&p.male) {
                return false;
            }
            taken.insert(p.female);
            taken.insert(p.male);
            true
        })
        .collect()
}

/// Match today's unpartnered adults and record each partnership.
pub fn match_partners<R: PersonRepository>(
    repo: &mut R,
    day: u32,
) -> Result<Vec<Pairing>, StoreError> {
    let candidates = repo.unpartnered_adults(MIN_PARTNER_AGE)?;
    let pairs = plan(&candidates);
    for pair in &pairs {
        repo.partner(pair.female, pair.male)?;
        tracing::info!(
            target: "partnership",
            day = day,
            female_id = pair.female.0,
            male_id = pair.male.0,
            age_gap = pair.age_gap,
        );
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::FamilyId;
    use crate::types::Profession;

    fn adult(id: u32, gender: Gender, age: u32, family: u32) -> Person {
        Person {
            id: PersonId(id),
            gender,
            age,
            alive: true,
            health: 100,
            profession: Profession::None,
            family: FamilyId(family),
            partner: None,
            mother: None,
            father: None,
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    #[test]
    fn eligibility_rules() {
        let f = adult(1, Gender::Female, 7000, 1);
        assert!(compatible(&f, &adult(2, Gender::Male, 7500, 2)));
        // same family
        assert!(!compatible(&f, &adult(3, Gender::Male, 7500, 1)));
        // gap of exactly 1460 days
        assert!(!compatible(&f, &adult(4, Gender::Male, 8460, 2)));
        // too young
        assert!(!compatible(&f, &adult(5, Gender::Male, 5844, 2)));
        // same gender
        assert!(!compatible(&f, &adult(6, Gender::Female, 7000, 2)));

        let mut dead = adult(7, Gender::Male, 7000, 2);
        dead.alive = false;
        assert!(!compatible(&f, &dead));
    }

    #[test]
    fn greedy_nearest_age() {
        let people = vec![
            adult(1, Gender::Female, 7000, 1),
            adult(2, Gender::Female, 7400, 2),
            adult(3, Gender::Male, 7350, 3),
            adult(4, Gender::Male, 6000, 4),
        ];
        // 2-3 (gap 50) goes first, leaving 1-4 (gap 1000).
        let pairs = plan(&people);
        assert_eq!(
            pairs,
            vec![
                Pairing {
                    female: PersonId(2),
                    male: PersonId(3),
                    age_gap: 50
                },
                Pairing {
                    female: PersonId(1),
                    male: PersonId(4),
                    age_gap: 1000
                },
            ]
        );
    }

    #[test]
    fn ties_break_on_identifiers() {
        let people = vec![
            adult(5, Gender::Female, 7000, 1),
            adult(2, Gender::Female, 7000, 2),
            adult(9, Gender::Male, 7100, 3),
        ];
        let pairs = plan(&people);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].female, PersonId(2));
    }
}
