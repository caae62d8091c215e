//! Configuration structures
//!
//! Loaded by `lunchsync-infra` from environment variables or a JSON/TOML
//! file. Every field has a default so partial files are accepted.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_LOG_FILTER, DEFAULT_RECOMPUTE_DEBOUNCE_MS, DEFAULT_STORE_RETRY_ATTEMPTS,
    DEFAULT_STORE_RETRY_BACKOFF_MS, DEFAULT_STORE_TIMEOUT_MS, DEFAULT_WATCHER_JOIN_TIMEOUT_MS,
};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub feasibility: FeasibilityConfig,
    pub logging: LoggingConfig,
}

/// Store access configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Upper bound for a single store round trip
    pub operation_timeout_ms: u64,
    /// Total attempts for retryable store failures (1 disables retries)
    pub retry_attempts: u32,
    /// Initial backoff between attempts, doubled after each failure
    pub retry_backoff_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            operation_timeout_ms: DEFAULT_STORE_TIMEOUT_MS,
            retry_attempts: DEFAULT_STORE_RETRY_ATTEMPTS,
            retry_backoff_ms: DEFAULT_STORE_RETRY_BACKOFF_MS,
        }
    }
}

impl StoreConfig {
    /// Per-call store timeout.
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    /// Delay before the first retry.
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Feasibility recomputation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeasibilityConfig {
    /// Window in which remote change notifications are coalesced
    pub recompute_debounce_ms: u64,
    /// Whether the watcher reacts to changes made by other sessions
    pub watch_remote_changes: bool,
    /// How long `stop()` waits for the watcher task
    pub join_timeout_ms: u64,
}

impl Default for FeasibilityConfig {
    fn default() -> Self {
        Self {
            recompute_debounce_ms: DEFAULT_RECOMPUTE_DEBOUNCE_MS,
            watch_remote_changes: true,
            join_timeout_ms: DEFAULT_WATCHER_JOIN_TIMEOUT_MS,
        }
    }
}

impl FeasibilityConfig {
    /// Window for coalescing change notifications.
    pub fn recompute_debounce(&self) -> Duration {
        Duration::from_millis(self.recompute_debounce_ms)
    }

    /// How long stopping a worker may take.
    pub fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info,lunchsync_core=debug`
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: DEFAULT_LOG_FILTER.to_string(), json: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "store": { "operation_timeout_ms": 250 } }"#).unwrap();

        assert_eq!(config.store.operation_timeout(), Duration::from_millis(250));
        assert_eq!(config.store.retry_attempts, DEFAULT_STORE_RETRY_ATTEMPTS);
        assert_eq!(config.feasibility, FeasibilityConfig::default());
        assert_eq!(config.logging.filter, "info");
    }
}
