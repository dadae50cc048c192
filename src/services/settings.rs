//! Settings engine: loads, saves, and updates engine settings.
//!
//! Settings are stored as a JSON file so every matching threshold can be
//! tuned without a rebuild. Individual values are updated by dot-notation
//! key path (`"locator.fuzzy_accept_fraction"`).

use std::fs;
use std::path::{Path, PathBuf};

use crate::types::errors::SettingsError;
use crate::types::settings::EngineSettings;

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<EngineSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &EngineSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn config_path(&self) -> &Path;
}

/// Settings engine persisting [`EngineSettings`] as JSON on disk.
pub struct SettingsEngine {
    config_path: PathBuf,
    settings: EngineSettings,
}

impl SettingsEngine {
    /// Creates a new engine. With no override, the file lives under
    /// `$CHATMARKS_DATA_DIR` (falling back to the working directory).
    pub fn new(path_override: Option<PathBuf>) -> Self {
        let config_path = path_override.unwrap_or_else(|| {
            let dir = std::env::var("CHATMARKS_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."));
            dir.join("chatmarks-settings.json")
        });
        Self {
            config_path,
            settings: EngineSettings::default(),
        }
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from disk; a missing file yields the defaults, a
    /// malformed file is an error.
    fn load(&mut self) -> Result<EngineSettings, SettingsError> {
        if !self.config_path.exists() {
            self.settings = EngineSettings::default();
            return Ok(self.settings.clone());
        }
        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read settings file: {}", e)))?;
        self.settings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse settings file: {}", e))
        })?;
        Ok(self.settings.clone())
    }

    fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create settings directory: {}", e))
            })?;
        }
        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;
        fs::write(&self.config_path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write settings file: {}", e)))
    }

    fn get_settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Updates one value by dot-notation path, validating the result
    /// against the settings schema before persisting.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }
        let mut tree = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        let parts: Vec<&str> = key.split('.').collect();
        let (last, intermediate) = parts.split_last().expect("key is non-empty");
        let mut current = &mut tree;
        for part in intermediate {
            let serde_json::Value::Object(map) = current else {
                return Err(SettingsError::InvalidKey(format!(
                    "Cannot navigate to key '{}': intermediate value is not an object",
                    key
                )));
            };
            current = map.get_mut(*part).ok_or_else(|| {
                SettingsError::InvalidKey(format!("Key '{}' not found in settings", key))
            })?;
        }
        let serde_json::Value::Object(map) = current else {
            return Err(SettingsError::InvalidKey(format!(
                "Cannot navigate to key '{}': intermediate value is not an object",
                key
            )));
        };
        if !map.contains_key(*last) {
            return Err(SettingsError::InvalidKey(format!(
                "Key '{}' not found in settings",
                key
            )));
        }
        map.insert(last.to_string(), value.clone());

        self.settings = serde_json::from_value(tree).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;
        self.save()
    }

    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = EngineSettings::default();
        self.save()
    }

    fn config_path(&self) -> &Path {
        &self.config_path
    }
}
