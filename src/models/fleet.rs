use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

/// A unicorn that can be assigned to a ride.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "PascalCase")]
pub struct FleetMember {
    pub name: String,
    pub color: String,
    pub gender: Gender,
}

impl FleetMember {
    pub fn new(name: impl Into<String>, color: impl Into<String>, gender: Gender) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            gender,
        }
    }
}
