use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::AppError;
use crate::models::fleet::{FleetMember, Gender};

/// Immutable catalog of assignable unicorns, loaded once at startup.
#[derive(Debug, Clone)]
pub struct FleetRegistry {
    members: Vec<FleetMember>,
}

impl FleetRegistry {
    pub fn new(members: Vec<FleetMember>) -> Result<Self, AppError> {
        if members.is_empty() {
            return Err(AppError::Configuration(
                "fleet must contain at least one unicorn".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for member in &members {
            if member.name.trim().is_empty() {
                return Err(AppError::Configuration(
                    "fleet member name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(member.name.as_str()) {
                return Err(AppError::Configuration(format!(
                    "duplicate fleet member {}",
                    member.name
                )));
            }
        }

        Ok(Self { members })
    }

    /// Reads a JSON array of `{"Name", "Color", "Gender"}` objects.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path).map_err(|err| {
            AppError::Configuration(format!("failed to read fleet file {}: {err}", path.display()))
        })?;
        let members: Vec<FleetMember> = serde_json::from_str(&raw).map_err(|err| {
            AppError::Configuration(format!("invalid fleet file {}: {err}", path.display()))
        })?;

        Self::new(members)
    }

    pub fn all_members(&self) -> &[FleetMember] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Default for FleetRegistry {
    fn default() -> Self {
        Self {
            members: vec![
                FleetMember::new("Bucephalus", "Golden", Gender::Male),
                FleetMember::new("Shadowfax", "White", Gender::Male),
                FleetMember::new("Rocinante", "Yellow", Gender::Female),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::FleetRegistry;
    use crate::error::AppError;
    use crate::models::fleet::{FleetMember, Gender};

    #[test]
    fn empty_fleet_is_a_configuration_error() {
        let err = FleetRegistry::new(Vec::new()).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = FleetRegistry::new(vec![
            FleetMember::new("Gil", "White", Gender::Male),
            FleetMember::new("Gil", "Black", Gender::Male),
        ])
        .unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn default_fleet_has_three_unicorns_in_order() {
        let fleet = FleetRegistry::default();
        let names: Vec<&str> = fleet
            .all_members()
            .iter()
            .map(|member| member.name.as_str())
            .collect();

        assert_eq!(names, ["Bucephalus", "Shadowfax", "Rocinante"]);
    }

    #[test]
    fn loads_fleet_from_json_file() {
        let path = std::env::temp_dir().join(format!("fleet-{}.json", uuid::Uuid::new_v4()));
        fs::write(
            &path,
            r#"[{"Name":"Angel","Color":"White","Gender":"Female"},
                {"Name":"Gil","Color":"White","Gender":"Male"}]"#,
        )
        .unwrap();

        let fleet = FleetRegistry::from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(fleet.len(), 2);
        assert_eq!(
            fleet.all_members()[0],
            FleetMember::new("Angel", "White", Gender::Female)
        );
    }

    #[test]
    fn empty_fleet_file_fails_fast() {
        let path = std::env::temp_dir().join(format!("fleet-{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, "[]").unwrap();

        let result = FleetRegistry::from_file(&path);
        fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(AppError::Configuration(_))));
    }
}
