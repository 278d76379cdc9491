//! Occupation by age and gender.

use crate::error::StoreError;
use crate::repo::PersonRepository;
use crate::types::{Gender, Person, Profession};

/// Elders forage.
pub const ELDER_AGE: u32 = 14610;
/// Adult women farm.
pub const WOMAN_AGE: u32 = 5113;
/// Boys and girls old enough to fish.
pub const FISHING_AGE: u32 = 3287;
/// Children old enough to gather.
pub const GATHERING_AGE: u32 = 1826;

/// The occupation a person should hold today.
///
/// An active emergency sends everyone to the fields. Otherwise the first
/// matching age rule wins, and the very young keep what they have.
pub fn assign(age: u32, gender: Gender, in_emergency: bool, current: Profession) -> Profession {
    if in_emergency {
        return Profession::Farmer;
    }
    if age > ELDER_AGE {
        Profession::Forager
    } else if age > FISHING_AGE && gender == Gender::Male {
        Profession::Fisher
    } else if age > WOMAN_AGE && gender == Gender::Female {
        Profession::Farmer
    } else if age > FISHING_AGE {
        Profession::Fisher
    } else if age > GATHERING_AGE {
        Profession::Forager
    } else {
        current
    }
}

/// Apply [`assign`] to living family members, writing only changes.
/// Returns how many members changed occupation.
pub fn reassign<R: PersonRepository>(
    repo: &mut R,
    members: &[Person],
    in_emergency: bool,
    day: u32,
) -> Result<usize, StoreError> {
    let mut changed = 0;
    for person in members.iter().filter(|p| p.alive) {
        let next = assign(person.age, person.gender, in_emergency, person.profession);
        if next == person.profession {
            continue;
        }
        repo.set_profession(person.id, next)?;
        tracing::info!(
            target: "occupation",
            day = day,
            person_id = person.id.0,
            from = person.profession.name(),
            to = next.name(),
        );
        changed += 1;
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_rules_in_precedence() {
        use Gender::*;
        use Profession::*;

        assert_eq!(assign(14611, Male, false, Farmer), Forager);
        assert_eq!(assign(14610, Female, false, None), Farmer);
        assert_eq!(assign(3288, Male, false, None), Fisher);
        assert_eq!(assign(5114, Female, false, None), Farmer);
        assert_eq!(assign(5113, Female, false, None), Fisher);
        assert_eq!(assign(3288, Female, false, None), Fisher);
        assert_eq!(assign(1827, Female, false, None), Forager);
        assert_eq!(assign(1826, Male, false, None), None);
        assert_eq!(assign(1826, Male, false, Farmer), Farmer);
    }

    #[test]
    fn emergency_overrides_everything() {
        assert_eq!(
            assign(20000, Gender::Male, true, Profession::Forager),
            Profession::Farmer
        );
        assert_eq!(
            assign(10, Gender::Female, true, Profession::None),
            Profession::Farmer
        );
    }
}
