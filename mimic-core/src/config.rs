//! Runtime configuration for mimic
//!
//! Holds the defaults a mock or verification falls back to when the caller
//! does not pick a mode explicitly.

use std::path::{Path, PathBuf};

use miette::Report;
use serde::{Deserialize, Serialize};

use crate::mode::{MockMode, VerifyMode};

pub type ConfigError = Report;

/// Environment variable pointing at a `mimic.toml` file.
pub const CONFIG_ENV: &str = "MIMIC_CONFIG";

fn config_msg(message: impl Into<String>) -> ConfigError {
    Report::msg(message.into())
}

fn default_trace_calls() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MimicConfig {
    /// Emit a `trace!` event per intercepted call
    #[serde(default = "default_trace_calls")]
    pub trace_calls: bool,

    /// Mode for mocks registered without an explicit one
    #[serde(default)]
    pub default_mock_mode: MockMode,

    // Kept last: counting modes serialize as TOML tables.
    /// Mode for verifications run without an explicit one
    #[serde(default)]
    pub default_verify_mode: VerifyMode,
}

impl Default for MimicConfig {
    fn default() -> Self {
        MimicConfig {
            trace_calls: true,
            default_mock_mode: MockMode::default(),
            default_verify_mode: VerifyMode::default(),
        }
    }
}

impl MimicConfig {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| config_msg(format!("Failed to read config {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse TOML from string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| config_msg(format!("Invalid config format: {}", e)))
    }

    /// Serialize to TOML string
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| config_msg(format!("Failed to serialize: {}", e)))
    }

    /// Load from `$MIMIC_CONFIG` when set, otherwise use defaults.
    ///
    /// A set but unreadable path is an error rather than a silent fallback.
    pub fn discover() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                let path = PathBuf::from(path);
                tracing::debug!(path = %path.display(), "loading mimic config");
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }
}
