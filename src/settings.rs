//! Collision tuning settings
//!
//! Loaded from a JSON file next to the level data. Every field has a default
//! so partial files only override what they name.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{GRAVITY, LEDGE_GRAB_RANGE, MAX_FALL_SPEED};

/// Errors that can occur when loading or saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Tunable physics values for the avatar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionSettings {
    /// Arm-to-corner distance within which a ledge can be grabbed
    pub ledge_grab_range: f64,
    /// Vertical acceleration (negative is down)
    pub gravity: f64,
    /// Terminal fall speed (positive)
    pub max_fall_speed: f64,
}

impl Default for CollisionSettings {
    fn default() -> Self {
        Self {
            ledge_grab_range: LEDGE_GRAB_RANGE,
            gravity: GRAVITY,
            max_fall_speed: MAX_FALL_SPEED,
        }
    }
}

impl CollisionSettings {
    /// Parse settings from JSON, filling missing fields with defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&content)?;
        log::info!("Loaded collision settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default collision settings ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Collision settings saved");
        Ok(())
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if !(self.ledge_grab_range >= 0.0) {
            return Err(SettingsError::Invalid(format!(
                "ledge_grab_range must be >= 0, got {}",
                self.ledge_grab_range
            )));
        }
        if !(self.max_fall_speed > 0.0) {
            return Err(SettingsError::Invalid(format!(
                "max_fall_speed must be > 0, got {}",
                self.max_fall_speed
            )));
        }
        Ok(())
    }
}
