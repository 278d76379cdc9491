//! Calorie emergency lifecycle.
//!
//! A family is either without an emergency or has exactly one active
//! record. A record opens when a fed-short family has a starving member and
//! is removed once it has been open for the configured number of days.
//! Removal is the only way out; there is no pause or re-trigger.

use crate::allocator::IdAllocator;
use crate::error::StoreError;
use crate::ids::FamilyId;
use crate::mortality::is_critical;
use crate::repo::EmergencyRepository;
use crate::types::{CalorieEmergency, Person};

pub fn is_due(emergency: &CalorieEmergency, day: u32, limit_days: u32) -> bool {
    day.saturating_sub(emergency.start_day) >= limit_days
}

/// Remove the family's emergency if it has run its course.
pub fn expire_if_due<R: EmergencyRepository>(
    repo: &mut R,
    family: FamilyId,
    day: u32,
    limit_days: u32,
) -> Result<Option<CalorieEmergency>, StoreError> {
    let Some(active) = repo.active_emergency(family)? else {
        return Ok(None);
    };
    if !is_due(&active, day, limit_days) {
        return Ok(None);
    }
    repo.remove_emergency(&active)?;
    tracing::info!(
        target: "emergency",
        day = day,
        family_id = family.0,
        emergency_id = active.id.0,
        transition = "expired",
    );
    Ok(Some(active))
}

/// Open an emergency when a living member is below the critical health
/// level and the family has none yet.
pub fn open_if_critical<R: EmergencyRepository>(
    repo: &mut R,
    ids: &mut IdAllocator,
    family: FamilyId,
    members: &[Person],
    day: u32,
) -> Result<Option<CalorieEmergency>, StoreError> {
    if !members.iter().any(|p| p.alive && is_critical(p.health)) {
        return Ok(None);
    }
    if repo.active_emergency(family)?.is_some() {
        return Ok(None);
    }

    let emergency = CalorieEmergency {
        id: ids.emergency(),
        family,
        active: true,
        start_day: day,
    };
    repo.open_emergency(&emergency)?;
    tracing::info!(
        target: "emergency",
        day = day,
        family_id = family.0,
        emergency_id = emergency.id.0,
        transition = "opened",
    );
    Ok(Some(emergency))
}
