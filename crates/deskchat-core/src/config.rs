//! Configuration management for deskchat.
//!
//! Loads configuration from ${DESKCHAT_HOME}/config.toml with sensible
//! defaults. A missing file is not an error; every section falls back to
//! its `Default`.

use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides the configured backend base URL.
pub const BASE_URL_ENV_VAR: &str = "DESKCHAT_BASE_URL";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub chat: ChatConfig,
    /// Per-action execution profile overrides, keyed by tool identifier.
    ///
    /// ```toml
    /// [actions.createServiceNowTicket]
    /// processing_text = "Creating a ServiceNow ticket..."
    /// outcome_text = "✓ Ticket created. You'll receive an email confirmation."
    /// duration_ms = 1500
    /// ```
    pub actions: HashMap<String, ActionProfileConfig>,
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Backend base URL; `DESKCHAT_BASE_URL` takes precedence, then this,
    /// then the built-in localhost default.
    pub base_url: Option<String>,
    /// Request timeout in seconds at the service boundary.
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Chat session settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Agent id to chat with when none is passed on the command line.
    pub agent: Option<String>,
}

/// One `[actions.<tool_call>]` override. Unset fields keep the default
/// profile's value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionProfileConfig {
    pub processing_text: Option<String>,
    pub outcome_text: Option<String>,
    pub duration_ms: Option<u64>,
}

impl Config {
    /// Loads the configuration from ${DESKCHAT_HOME}/config.toml.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = paths::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration document.
    ///
    /// # Errors
    /// Returns an error if the document is not valid TOML for this schema.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config.toml")
    }
}

pub mod paths {
    //! Path resolution for deskchat configuration.
    //!
    //! DESKCHAT_HOME resolution order:
    //! 1. DESKCHAT_HOME environment variable (if set)
    //! 2. ~/.config/deskchat (default)

    use std::path::PathBuf;

    /// Returns the deskchat home directory.
    pub fn deskchat_home() -> PathBuf {
        if let Ok(home) = std::env::var("DESKCHAT_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("deskchat"))
            .unwrap_or_else(|| PathBuf::from(".deskchat"))
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        deskchat_home().join("config.toml")
    }
}
