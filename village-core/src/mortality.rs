//! Health changes from feeding, and death.
//!
//! A hungry family loses health in tiers set by how much of its need was
//! met. A fed family recovers slowly. Health at or below zero is death,
//! which is final.

pub const MAX_HEALTH: i32 = 100;
/// Below this a member counts as starving for the emergency check.
pub const CRITICAL_HEALTH: i32 = 75;
pub const SURPLUS_GAIN: i32 = 5;
/// Recovery only applies strictly below this value.
pub const SURPLUS_CEILING: i32 = 96;

/// Health lost on a deficit day, given supply over demand.
///
/// - above 0.75 → 2
/// - above 0.5 → 5
/// - above 0.25 → 7
/// - otherwise → 15
pub fn deficit_loss(ratio: f64) -> i32 {
    if ratio > 0.75 {
        2
    } else if ratio > 0.5 {
        5
    } else if ratio > 0.25 {
        7
    } else {
        15
    }
}

/// What a deficit does to one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthOutcome {
    Survives { health: i32 },
    Dies,
}

pub fn after_deficit(health: i32, loss: i32) -> HealthOutcome {
    let health = health - loss;
    if health <= 0 {
        HealthOutcome::Dies
    } else {
        HealthOutcome::Survives {
            health: health.min(MAX_HEALTH),
        }
    }
}

/// New health after a surplus day, or `None` when it does not change.
///
/// Values from [`SURPLUS_CEILING`] up are left where they are.
pub fn after_surplus(health: i32) -> Option<i32> {
    (health < SURPLUS_CEILING).then(|| (health + SURPLUS_GAIN).clamp(0, MAX_HEALTH))
}

pub fn is_critical(health: i32) -> bool {
    health < CRITICAL_HEALTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_tiers() {
        assert_eq!(deficit_loss(0.9), 2);
        assert_eq!(deficit_loss(0.75), 5);
        assert_eq!(deficit_loss(0.51), 5);
        assert_eq!(deficit_loss(0.5), 7);
        assert_eq!(deficit_loss(0.26), 7);
        assert_eq!(deficit_loss(0.25), 15);
        assert_eq!(deficit_loss(0.0), 15);
    }

    #[test]
    fn death_at_zero() {
        assert_eq!(after_deficit(15, 15), HealthOutcome::Dies);
        assert_eq!(after_deficit(3, 7), HealthOutcome::Dies);
        assert_eq!(after_deficit(16, 15), HealthOutcome::Survives { health: 1 });
    }

    #[test]
    fn surplus_gain_and_ceiling() {
        assert_eq!(after_surplus(50), Some(55));
        assert_eq!(after_surplus(95), Some(100));
        assert_eq!(after_surplus(96), None);
        assert_eq!(after_surplus(100), None);
    }

    #[test]
    fn critical_threshold() {
        assert!(is_critical(74));
        assert!(!is_critical(75));
    }
}
