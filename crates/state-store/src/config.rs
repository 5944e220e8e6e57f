//! Store configuration
//!
//! Loaded from a TOML file, every field has a default so partial files work.

use crate::error::StoreError;
use crate::history::DEFAULT_MAX_HISTORY;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StoreConfig {
    /// Number of dispatched actions kept in the action log
    #[serde(default = "default_max_action_history")]
    pub max_action_history: usize,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub middleware: MiddlewareConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HistoryConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_max_history")]
    pub max_size: usize,
}

/// Tunables for the built-in middleware
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MiddlewareConfig {
    #[serde(default = "default_slow_dispatch_threshold_ms")]
    pub slow_dispatch_threshold_ms: u64,

    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_max_action_history() -> usize {
    100
}

fn default_max_history() -> usize {
    DEFAULT_MAX_HISTORY
}

fn default_slow_dispatch_threshold_ms() -> u64 {
    16 // one frame at 60fps
}

fn default_throttle_ms() -> u64 {
    1000
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_action_history: default_max_action_history(),
            history: HistoryConfig::default(),
            middleware: MiddlewareConfig::default(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_size: default_max_history(),
        }
    }
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            slow_dispatch_threshold_ms: default_slow_dispatch_threshold_ms(),
            throttle_ms: default_throttle_ms(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl MiddlewareConfig {
    pub fn slow_dispatch_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_dispatch_threshold_ms)
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl StoreConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| StoreError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config = Self::from_toml_str(&content).map_err(|e| StoreError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        log::info!("Loaded store config from {}", path.display());
        Ok(config)
    }

    /// Load config from `path` if it exists, otherwise use defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{}", e);
                Self::default()
            }
        }
    }
}
