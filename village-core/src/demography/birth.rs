//! Births.
//!
//! A partnered woman whose partner is alive has a child when she has fewer
//! than [`MAX_LIVING_CHILDREN`] living children and none of them is younger
//! than [`BIRTH_SPACING_DAYS`].

use rand::Rng;

use crate::allocator::IdAllocator;
use crate::demography::names::NameGenerator;
use crate::error::SimError;
use crate::ids::PersonId;
use crate::mortality::MAX_HEALTH;
use crate::repo::PersonRepository;
use crate::types::{Gender, Person, Profession};

pub const MAX_LIVING_CHILDREN: usize = 5;
pub const BIRTH_SPACING_DAYS: u32 = 365;
pub const NEWBORN_AGE: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Birth {
    pub child: PersonId,
    pub mother: PersonId,
    pub father: PersonId,
    pub gender: Gender,
}

/// Whether a mother with these living children can have another.
pub fn can_conceive(living_children: &[Person]) -> bool {
    living_children.len() < MAX_LIVING_CHILDREN
        && living_children.iter().all(|c| c.age >= BIRTH_SPACING_DAYS)
}

fn newborn(id: PersonId, mother: &Person, father: PersonId, gender: Gender, first_name: String) -> Person {
    Person {
        id,
        gender,
        age: NEWBORN_AGE,
        alive: true,
        health: MAX_HEALTH,
        profession: Profession::None,
        family: mother.family,
        partner: None,
        mother: Some(mother.id),
        father: Some(father),
        first_name,
        last_name: mother.last_name.clone(),
    }
}

/// Evaluate every partnered woman among `members` and create the children.
pub fn evaluate_births<R: PersonRepository, G: Rng>(
    repo: &mut R,
    ids: &mut IdAllocator,
    names: &mut NameGenerator,
    rng: &mut G,
    members: &[Person],
    day: u32,
) -> Result<Vec<Birth>, SimError> {
    let mut births = Vec::new();

    for mother in members
        .iter()
        .filter(|p| p.alive && p.gender == Gender::Female)
    {
        let Some(partner_id) = mother.partner else {
            continue;
        };
        let father = repo.person(partner_id)?;
        if father.partner != Some(mother.id) {
            return Err(SimError::Inconsistent(format!(
                "{} names {} as partner, but {} names {:?}",
                mother.id, partner_id, partner_id, father.partner
            )));
        }
        if !father.alive {
            continue;
        }

        let living: Vec<Person> = repo
            .children_of(mother.id)?
            .into_iter()
            .filter(|c| c.alive)
            .collect();
        if !can_conceive(&living) {
            continue;
        }

        let gender = if rng.random_bool(0.5) {
            Gender::Female
        } else {
            Gender::Male
        };
        let child = newborn(ids.person(), mother, father.id, gender, names.generate(rng));
        repo.create_person(&child)?;

        tracing::info!(
            target: "birth",
            day = day,
            child_id = child.id.0,
            mother_id = mother.id.0,
            father_id = father.id.0,
            family_id = mother.family.0,
            gender = gender.code(),
        );
        births.push(Birth {
            child: child.id,
            mother: mother.id,
            father: father.id,
            gender,
        });
    }
    Ok(births)
}
