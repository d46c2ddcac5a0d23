use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Optional `monitor.toml`.  Every field has a default, so a missing file and
/// an empty file behave the same.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    #[serde(default)]
    pub version_key_fallback: VersionKeyFallback,

    #[serde(default)]
    pub log: LogConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            probe_timeout_secs: default_probe_timeout_secs(),
            version_key_fallback: VersionKeyFallback::default(),
            log: LogConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(100))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs.max(1))
    }
}

/// Where the second attempt to open the agent's `Installer` key goes when the
/// first one fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionKeyFallback {
    /// Reopen the same `SOFTWARE\<Service>\Installer` path.
    RetryPrimary,
    /// Try `SOFTWARE\WOW6432Node\<Service>\Installer`, like the settings key.
    #[default]
    Wow64Node,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_true")]
    pub to_file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: true,
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_probe_timeout_secs() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".into()
}

fn default_true() -> bool {
    true
}
