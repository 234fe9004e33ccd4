// Settings module
// User-adjustable scheduler settings persisted as TOML

use serde::{Deserialize, Serialize};

use crate::utils::date::TimeGrid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// First bookable hour of the working day.
    pub first_hour: u32,
    /// Last bookable hour of the working day (inclusive).
    pub last_hour: u32,
    /// Reserved hour that never accepts a visit.
    pub lunch_hour: u32,
    /// SQLite database path; `None` means the platform data directory.
    pub database_path: Option<String>,
    /// Technician whose calendar opens by default.
    pub default_technician: Option<String>,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        let grid = TimeGrid::default();
        Self {
            first_hour: grid.first_hour(),
            last_hour: grid.last_hour(),
            lunch_hour: grid.lunch_hour(),
            database_path: None,
            default_technician: None,
        }
    }
}

impl SchedulerSettings {
    pub fn validate(&self) -> Result<(), String> {
        TimeGrid::new(self.first_hour, self.last_hour, self.lunch_hour).map(|_| ())
    }

    /// Time grid described by these settings, or the default grid when the
    /// hours are inconsistent.
    pub fn time_grid(&self) -> TimeGrid {
        TimeGrid::new(self.first_hour, self.last_hour, self.lunch_hour).unwrap_or_else(|err| {
            log::warn!("Invalid work hours in settings ({}), using defaults", err);
            TimeGrid::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = SchedulerSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.time_grid(), TimeGrid::default());
    }

    #[test]
    fn test_invalid_hours_fall_back_to_default_grid() {
        let settings = SchedulerSettings {
            first_hour: 18,
            last_hour: 8,
            ..SchedulerSettings::default()
        };
        assert!(settings.validate().is_err());
        assert_eq!(settings.time_grid(), TimeGrid::default());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: SchedulerSettings = toml::from_str("lunch_hour = 13").unwrap();
        assert_eq!(settings.lunch_hour, 13);
        assert_eq!(settings.first_hour, 6);
        assert_eq!(settings.last_hour, 17);
    }
}
