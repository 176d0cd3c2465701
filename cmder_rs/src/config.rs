//! Configuration file support.
//!
//! Loads an optional TOML file (by default `cmder.toml` in the working
//! directory). Every field has a default, so a missing file is not an
//! error.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::qa::QaOptions;

/// Default file name looked up by the console host.
pub const DEFAULT_CONFIG_FILE: &str = "cmder.toml";

fn default_prefix() -> String {
    "/".to_string()
}

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CmderConfig {
    /// Marks a chat line as a command.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Answering policy for group chats and team posts.
    pub qa: QaOptions,
}

impl Default for CmderConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            qa: QaOptions::default(),
        }
    }
}

impl CmderConfig {
    /// Load config from a specific path.
    /// Returns default config if the file doesn't exist or is invalid.
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("failed to parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
