//! Editor configuration.
//!
//! All knobs have defaults matching the canvas conventions (250 / 150 / 50
//! stack layout, +50/+50 duplicate offset, unbounded history). A JSON
//! document may override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;
use crate::coalesce::CoalesceConfig;
use crate::history::HistoryConfig;
use crate::layout::LayoutConfig;
use crate::types::Position;

/// Environment variable naming a JSON config file.
pub const CONFIG_PATH_ENV: &str = "PROCESS_MAP_CONFIG";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// Config JSON could not be parsed.
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// Values parsed but violate a constraint.
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Editor session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Auto-layout parameters.
    pub layout: LayoutConfig,
    /// Offset applied to duplicated nodes.
    pub duplicate_offset: Position,
    /// Undo/redo log settings.
    pub history: HistoryConfig,
    /// Gesture coalescing settings.
    pub coalesce: CoalesceConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            duplicate_offset: Position::new(50.0, 50.0),
            history: HistoryConfig::default(),
            coalesce: CoalesceConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Load from the file named by [`CONFIG_PATH_ENV`], or defaults if unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => Self::from_path(path),
            _ => Ok(Self::default()),
        }
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.layout.is_valid() {
            return Err(ConfigError::Invalid(
                "layout.row_height must be positive and all layout values finite".to_string(),
            ));
        }
        if self.history.max_entries == Some(0) {
            return Err(ConfigError::Invalid("history.max_entries must be at least 1".to_string()));
        }
        if !self.duplicate_offset.x.is_finite() || !self.duplicate_offset.y.is_finite() {
            return Err(ConfigError::Invalid("duplicate_offset must be finite".to_string()));
        }
        Ok(())
    }

    /// Deterministic hash of the configuration, for logging which settings
    /// a session ran with.
    pub fn config_hash(&self) -> String {
        canonical_hash_hex(self)
    }
}
