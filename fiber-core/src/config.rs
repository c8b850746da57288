//! Top-level engine configuration.

use serde::{Deserialize, Serialize};

use std::path::Path;

use crate::host::HostConfig;
use crate::monitor::MonitorConfig;

/// Combined host and monitor configuration.
///
/// Every field has a default, so partial JSON documents are accepted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Render loop settings.
    pub host: HostConfig,
    /// Quality controller settings.
    pub monitor: MonitorConfig,
}

impl EngineConfig {
    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or has wrongly typed fields.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), "Loaded engine config");
        Ok(config)
    }

    /// Serialize as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Configuration parsing failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Malformed or mistyped JSON.
    #[error("Invalid engine config: {0}")]
    Json(#[from] serde_json::Error),

    /// The config file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}
