//! Configuration management for metric-units
//!
//! Handles loading and validating configuration from YAML files.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Configuration file errors
#[derive(Error, Debug)]
pub enum LoadError {
    /// Error reading the configuration file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Error parsing the configuration file
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Log level used when none is given on the command line
    #[serde(default)]
    pub log_level: Option<String>,

    /// Unit conversion blocks, applied in order
    #[serde(default)]
    pub processors: Vec<UnitsConfig>,
}

/// One unit conversion block
///
/// # Example Configuration (YAML)
///
/// ```yaml
/// pattern: "_in$"
/// from: celsius
/// to: fahrenheit
/// replacement: "_out"
/// unit_suffix: true
/// tags:
///   converted: "true"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitsConfig {
    /// Regex matched against field names
    #[serde(default)]
    pub pattern: String,

    /// Source unit name
    #[serde(default, alias = "unit")]
    pub from: String,

    /// Destination unit name
    #[serde(default, alias = "dest_unit")]
    pub to: String,

    /// Replacement template for the matched part of the field name
    ///
    /// Supports `$0`, `${1}` and `$name` capture references. Empty means
    /// keep the match as is.
    #[serde(default)]
    pub replacement: String,

    /// Append `_total` to converted field names
    #[serde(default)]
    pub is_counter: bool,

    /// Append `_<destination unit>` to converted field names
    #[serde(default, alias = "auto_suffix")]
    pub unit_suffix: bool,

    /// Static tags added to metrics with a matching field
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl UnitsConfig {
    /// Create a block converting `from` to `to` for fields matching `pattern`
    pub fn new(
        pattern: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            from: from.into(),
            to: to.into(),
            ..Self::default()
        }
    }

    /// Set the replacement template
    pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = replacement.into();
        self
    }

    /// Mark converted fields as counters
    pub fn with_counter(mut self, is_counter: bool) -> Self {
        self.is_counter = is_counter;
        self
    }

    /// Enable the destination unit suffix
    pub fn with_unit_suffix(mut self, unit_suffix: bool) -> Self {
        self.unit_suffix = unit_suffix;
        self
    }

    /// Add a static tag
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate configuration from a YAML string
    pub fn from_yaml(contents: &str) -> Result<Self, LoadError> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), LoadError> {
        if self.processors.is_empty() {
            return Err(LoadError::ValidationError(
                "At least one processor must be configured".to_string(),
            ));
        }

        for (index, block) in self.processors.iter().enumerate() {
            for (key, value) in [
                ("pattern", &block.pattern),
                ("from", &block.from),
                ("to", &block.to),
            ] {
                if value.trim().is_empty() {
                    return Err(LoadError::ValidationError(format!(
                        "Processor {} is missing '{}'",
                        index, key
                    )));
                }
            }
        }

        Ok(())
    }
}
