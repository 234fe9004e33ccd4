use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

use crate::models::settings::SchedulerSettings;

const SETTINGS_FILE: &str = "settings.toml";
const DATABASE_FILE: &str = "schedule.db";

/// Reads and writes `SchedulerSettings` as a TOML file.
pub struct SettingsService {
    path: PathBuf,
}

impl SettingsService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Service bound to the platform config directory, or the current
    /// directory when none can be resolved.
    pub fn platform_default() -> Self {
        let path = project_dirs()
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
            .unwrap_or_else(|| {
                log::warn!("Unable to resolve config directory; using current dir for settings");
                PathBuf::from(SETTINGS_FILE)
            });
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings from disk.
    pub fn load(&self) -> Result<SchedulerSettings> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let settings: SchedulerSettings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings in {}", self.path.display()))?;
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is missing or
    /// unusable.
    pub fn load_or_default(&self) -> SchedulerSettings {
        if !self.path.exists() {
            log::info!("No settings at {}, using defaults", self.path.display());
            return SchedulerSettings::default();
        }

        match self.load() {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Failed to load settings: {:#}, using defaults", e);
                SchedulerSettings::default()
            }
        }
    }

    /// Write settings to disk, creating parent directories as needed.
    pub fn save(&self, settings: &SchedulerSettings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))?;
        Ok(())
    }

    /// Database path from settings, or the platform data directory.
    pub fn resolve_database_path(settings: &SchedulerSettings) -> PathBuf {
        if let Some(path) = &settings.database_path {
            return PathBuf::from(path);
        }

        match project_dirs() {
            Some(dirs) => {
                let data_dir = dirs.data_dir();
                if let Err(e) = std::fs::create_dir_all(data_dir) {
                    log::warn!("Failed to create data directory {}: {}", data_dir.display(), e);
                }
                data_dir.join(DATABASE_FILE)
            }
            None => PathBuf::from(DATABASE_FILE),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "FieldOps", "VisitScheduler")
}
