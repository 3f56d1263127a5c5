//! Configuration for the sensor log dashboard.

use crate::core::{ParserOptions, SensorLogParser};
use crate::schema::{AlignmentPolicy, MissingValuePolicy, PredictionSchema, SchemaVariant};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default port for `sensorlog serve`.
pub const DEFAULT_SERVER_PORT: u16 = 8787;

/// Main configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Layout of the logs this deployment produces
    pub variant: SchemaVariant,

    /// Overrides the variant's zero-reading policy when set
    pub missing_value_policy: Option<MissingValuePolicy>,

    /// How prediction logs of a different length are merged
    pub alignment: AlignmentPolicy,

    /// Overrides the variant's prediction class names when set
    pub prediction_classes: Option<Vec<String>>,

    /// Directory for exported CSV files
    pub export_path: PathBuf,

    /// Port the HTTP server binds to
    pub server_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sensorlog-dashboard");

        Self {
            variant: SchemaVariant::default(),
            missing_value_policy: None,
            alignment: AlignmentPolicy::default(),
            prediction_classes: None,
            export_path: data_dir.join("exports"),
            server_port: DEFAULT_SERVER_PORT,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sensorlog-dashboard")
            .join("config.json")
    }

    /// Ensure the export directory exists.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.export_path)?;
        Ok(())
    }

    /// Parser options for the configured variant with overrides applied.
    pub fn parser_options(&self) -> ParserOptions {
        let mut options = ParserOptions::for_variant(self.variant);
        if let Some(policy) = self.missing_value_policy {
            options.missing_value_policy = policy;
        }
        if let Some(ref classes) = self.prediction_classes {
            options.prediction_schema = Some(PredictionSchema::new(classes.iter().cloned()));
        }
        options.alignment = self.alignment;
        options
    }

    /// Build the parser this configuration describes.
    pub fn parser(&self) -> SensorLogParser {
        SensorLogParser::new(self.parser_options())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}
