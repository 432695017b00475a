use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::ReminderConfig;

/// Explains where the values of a loaded [ReminderConfig] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No settings file yet, defaults are used.
    Missing,
    /// The file was parsed. Fields listed in `rejected` had a wrong type or value and kept their
    /// defaults.
    Loaded { rejected: Vec<String> },
    /// The file could not be read or is not a JSON object, defaults are used.
    Corrupt(String),
}

/// Reads and writes [ReminderConfig] as a JSON document.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the settings on top of the defaults. Never fails, the outcome tells what happened.
    pub fn load(&self) -> (ReminderConfig, LoadOutcome) {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No settings at {:?}, using defaults", self.path);
                return (ReminderConfig::default(), LoadOutcome::Missing);
            }
            Err(e) => {
                warn!("Failed to read settings at {:?}: {e}", self.path);
                return (ReminderConfig::default(), LoadOutcome::Corrupt(e.to_string()));
            }
        };

        let on_disk = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                warn!("Settings at {:?} are not a JSON object", self.path);
                return (
                    ReminderConfig::default(),
                    LoadOutcome::Corrupt(format!("expected a JSON object, found {other}")),
                );
            }
            Err(e) => {
                warn!("Settings at {:?} are not valid JSON: {e}", self.path);
                return (ReminderConfig::default(), LoadOutcome::Corrupt(e.to_string()));
            }
        };

        let (config, rejected) = overlay_on_defaults(on_disk);
        if !rejected.is_empty() {
            warn!("Ignored invalid settings fields {rejected:?}, defaults kept for them");
        }
        (config, LoadOutcome::Loaded { rejected })
    }

    /// Writes the whole config, replacing the previous file.
    pub fn save(&self, config: &ReminderConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write settings to {:?}", self.path))?;
        info!("Saved settings to {:?}", self.path);
        Ok(())
    }
}

/// Applies on-disk fields one by one. A field that doesn't deserialize into its type is dropped so
/// that the rest of the file still counts.
fn overlay_on_defaults(on_disk: Map<String, Value>) -> (ReminderConfig, Vec<String>) {
    let Ok(Value::Object(mut merged)) = serde_json::to_value(ReminderConfig::default()) else {
        unreachable!("ReminderConfig always serializes into an object")
    };

    let mut rejected = vec![];
    for (key, value) in on_disk {
        if !merged.contains_key(&key) {
            debug!("Skipping unknown settings field {key}");
            continue;
        }
        let previous = merged.insert(key.clone(), value);
        if serde_json::from_value::<ReminderConfig>(Value::Object(merged.clone())).is_err() {
            if let Some(previous) = previous {
                merged.insert(key.clone(), previous);
            }
            rejected.push(key);
        }
    }

    let config = serde_json::from_value(Value::Object(merged)).unwrap_or_default();
    (config, rejected)
}
