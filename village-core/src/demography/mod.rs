//! Population rules: aging, occupations, partnering and births.

pub mod birth;
pub mod names;
pub mod occupation;
pub mod partnering;

pub use birth::{Birth, evaluate_births};
pub use names::NameGenerator;
pub use occupation::{assign, reassign};
pub use partnering::{Pairing, match_partners};

use crate::error::StoreError;
use crate::repo::PersonRepository;

/// Age every living person by one day. Dead persons keep their age.
pub fn age_population<R: PersonRepository>(repo: &mut R) -> Result<usize, StoreError> {
    repo.age_all_living()
}
