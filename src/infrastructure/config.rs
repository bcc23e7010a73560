//! Configuration management

use crate::validation::rules::DEFAULT_MAX_NAME_LENGTH;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Output format of a rendered document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// YAML
    Yaml,
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

/// Settings for validation, rendering and logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,
    /// Longest accepted job, tab or property name
    pub max_name_length: usize,
    /// Format produced by [`Document::render`](super::Document::render)
    pub document_format: DocumentFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            document_format: DocumentFormat::Json,
        }
    }
}

impl Config {
    /// Parses a configuration from YAML; missing keys keep their defaults
    ///
    /// # Errors
    ///
    /// Fails if `text` is not valid YAML for this structure.
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Failed to parse configuration")
    }

    /// Loads a configuration file
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid configuration in {}", path.display()))
    }
}
