use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::ids::{EmergencyId, FamilyId, PersonId, ResourceId};

// ============================================================================
// Enumerations stored as text literals in the graph
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn code(self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, StoreError> {
        match code {
            "M" => Ok(Gender::Male),
            "F" => Ok(Gender::Female),
            other => Err(StoreError::UnknownLiteral {
                what: "gender",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Profession {
    #[default]
    None,
    Farmer,
    Fisher,
    Forager,
}

impl Profession {
    pub fn name(self) -> &'static str {
        match self {
            Profession::None => "none",
            Profession::Farmer => "farmer",
            Profession::Fisher => "fisher",
            Profession::Forager => "forager",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, StoreError> {
        match name {
            "none" => Ok(Profession::None),
            "farmer" => Ok(Profession::Farmer),
            "fisher" => Ok(Profession::Fisher),
            "forager" => Ok(Profession::Forager),
            other => Err(StoreError::UnknownLiteral {
                what: "profession",
                value: other.to_string(),
            }),
        }
    }
}

/// The fixed resource taxonomy every family draws food from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Agricultural produce, grown by farmers.
    Garden,
    /// Shoreline gathering, collected by foragers.
    Coastal,
    /// Today's catch, landed by fishers.
    PrimaryMarine,
    /// Catch carried over one day.
    SecondaryMarine,
    /// Catch carried over two days; spoils after this stage.
    TertiaryMarine,
}

impl ResourceKind {
    pub fn all() -> impl Iterator<Item = ResourceKind> {
        [
            ResourceKind::Garden,
            ResourceKind::Coastal,
            ResourceKind::PrimaryMarine,
            ResourceKind::SecondaryMarine,
            ResourceKind::TertiaryMarine,
        ]
        .into_iter()
    }

    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Garden => "garden",
            ResourceKind::Coastal => "coast",
            ResourceKind::PrimaryMarine => "marine",
            ResourceKind::SecondaryMarine => "marine-b",
            ResourceKind::TertiaryMarine => "marine-c",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, StoreError> {
        ResourceKind::all()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| StoreError::UnknownLiteral {
                what: "resource",
                value: name.to_string(),
            })
    }
}

// ============================================================================
// Records
// ============================================================================

/// An individual villager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub gender: Gender,
    /// Age in days.
    pub age: u32,
    pub alive: bool,
    /// Always within [0, 100].
    pub health: i32,
    pub profession: Profession,
    pub family: FamilyId,
    pub partner: Option<PersonId>,
    pub mother: Option<PersonId>,
    pub father: Option<PersonId>,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub family: FamilyId,
    pub kind: ResourceKind,
    /// Units left after the most recent day's consumption.
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalorieEmergency {
    pub id: EmergencyId,
    pub family: FamilyId,
    pub active: bool,
    /// Day index on which the emergency was opened.
    pub start_day: u32,
}

/// Living members of a family per occupation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfessionCounts {
    pub farmers: u32,
    pub fishers: u32,
    pub foragers: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_round_trip() {
        for kind in ResourceKind::all() {
            assert_eq!(ResourceKind::from_name(kind.name()).unwrap(), kind);
        }
        assert_eq!(Gender::from_code("F").unwrap(), Gender::Female);
        assert_eq!(Profession::from_name("fisher").unwrap(), Profession::Fisher);
        assert!(Profession::from_name("smith").is_err());
    }
}
