use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::coordinator::PollSettings;
use crate::error::{Error, Result};

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

const HOME_ENV: &str = "SCCTL_HOME";
const TIMEOUT_ENV: &str = "SCCTL_TIMEOUT_MS";
const POLL_INTERVAL_ENV: &str = "SCCTL_POLL_INTERVAL_MS";

/// Get the scctl home directory (~/.scctl, or $SCCTL_HOME)
pub fn home_dir() -> Option<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return Some(PathBuf::from(home));
    }
    dirs::home_dir().map(|home| home.join(".scctl"))
}

/// Get the settings file path (~/.scctl/config.json)
pub fn config_path() -> Option<PathBuf> {
    home_dir().map(|home| home.join("config.json"))
}

/// Timing used by state-changing operations.
///
/// Read-only once handed to a `ServiceManager`; per-call overrides go through
/// `ControlOptions::timeout` instead of mutating this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Per-item convergence timeout
    pub timeout_ms: u64,

    /// Delay between two polls of the same item
    pub poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Settings {
    /// Defaults, then the settings file, then environment overrides
    pub fn load() -> Result<Self> {
        let mut settings = match config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        settings.apply_env();
        Ok(settings)
    }

    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Config {
            path: path.clone(),
            source,
        })?;
        let settings = serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.clone(),
            source,
        })?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn apply_env(&mut self) {
        if let Some(value) = env_millis(TIMEOUT_ENV) {
            self.timeout_ms = value;
        }
        if let Some(value) = env_millis(POLL_INTERVAL_ENV) {
            self.poll_interval_ms = value;
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = saturating_millis(timeout);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = saturating_millis(interval);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Poll timing for one batch, with an optional per-call timeout in milliseconds
    pub fn poll_settings(&self, timeout_override: Option<u64>) -> PollSettings {
        PollSettings {
            interval: self.poll_interval(),
            timeout: timeout_override
                .map(Duration::from_millis)
                .unwrap_or_else(|| self.timeout()),
        }
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn env_millis(name: &str) -> Option<u64> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: expected milliseconds", name, raw);
            None
        }
    }
}
