//! Library configuration.
//!
//! Loaded from a `gitminer.toml` next to the caller's data, e.g.:
//!
//! ```toml
//! git_binary = "/usr/local/bin/git"
//! timeout_secs = 300
//! ```
//!
//! Everything has a sensible default; a missing file is not an error and
//! a malformed file falls back to defaults with a warning.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

const CONFIG_FILE: &str = "gitminer.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MinerConfig {
    /// Git executable name or absolute path.
    pub git_binary: String,
    /// Per-invocation timeout in seconds; 0 disables the timeout.
    pub timeout_secs: u64,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            git_binary: "git".to_string(),
            timeout_secs: 120,
        }
    }
}

impl MinerConfig {
    /// Load `gitminer.toml` from `dir`, falling back to defaults.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(CONFIG_FILE);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Self::default();
            }
        };
        match toml::from_str(&raw) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), %err, "invalid config, using defaults");
                Self::default()
            }
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}
