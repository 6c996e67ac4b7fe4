//! yqfk configuration system.
//!
//! Everything has a default so a bare `yqfk -u .. -p .. -k ..` works without
//! a config file. CLI flags are layered on top by the binary.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, YqfkError};
use crate::types::Credentials;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YqfkConfig {
    #[serde(default)]
    pub account: AccountConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl YqfkConfig {
    /// Load config from `path` if it exists. A broken file falls back to the
    /// defaults and hands the error back for the caller to log.
    pub fn load_or_default(path: &Path) -> (Self, Option<YqfkError>) {
        if !path.exists() {
            return (Self::default(), None);
        }
        match Self::load_from(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| YqfkError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| YqfkError::Config(format!("Failed to parse config: {e}")))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".yqfk")
            .join("config.toml")
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.account.username, &self.account.password)
    }
}

/// Portal account.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AccountConfig {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Push relay settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// ServerChan send key, used as a path segment.
    #[serde(default)]
    pub key: String,
}

/// When the daily run fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// 5-field cron expression: MIN HOUR DOM MON DOW.
    #[serde(default = "default_cron")]
    pub cron: String,
    /// IANA timezone used for the schedule and log timestamps.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_cron() -> String { "10 6 * * *".into() }
fn default_timezone() -> String { "Asia/Shanghai".into() }

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron: default_cron(),
            timezone: default_timezone(),
        }
    }
}

impl ScheduleConfig {
    pub fn tz(&self) -> Result<chrono_tz::Tz> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|e| YqfkError::Config(format!("Invalid timezone '{}': {e}", self.timezone)))
    }
}
