//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Environment variables, when at least one `LUNCHSYNC_*` variable is set
//! 2. Otherwise the first config file found by [`probe_config_paths`]
//! 3. Otherwise [`AppConfig::default`]
//!
//! Unset variables and missing file fields keep their defaults.
//!
//! ## Environment Variables
//! - `LUNCHSYNC_STORE_TIMEOUT_MS`: Upper bound for one store call
//! - `LUNCHSYNC_STORE_RETRY_ATTEMPTS`: Attempts for retryable store failures
//! - `LUNCHSYNC_STORE_RETRY_BACKOFF_MS`: Initial retry backoff
//! - `LUNCHSYNC_RECOMPUTE_DEBOUNCE_MS`: Watcher debounce window
//! - `LUNCHSYNC_WATCH_REMOTE_CHANGES`: Whether the watcher runs (true/false)
//! - `LUNCHSYNC_LOG_FILTER`: `EnvFilter` directive
//! - `LUNCHSYNC_LOG_JSON`: JSON log output (true/false)
//!
//! ## File Locations
//! 1. `./config.{json,toml}` and `./lunchsync.{json,toml}`
//! 2. `../config.{json,toml}` and `../../config.{json,toml}`
//! 3. The same names relative to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use lunchsync_domain::{AppConfig, LunchError, Result};

pub const ENV_STORE_TIMEOUT_MS: &str = "LUNCHSYNC_STORE_TIMEOUT_MS";
pub const ENV_STORE_RETRY_ATTEMPTS: &str = "LUNCHSYNC_STORE_RETRY_ATTEMPTS";
pub const ENV_STORE_RETRY_BACKOFF_MS: &str = "LUNCHSYNC_STORE_RETRY_BACKOFF_MS";
pub const ENV_RECOMPUTE_DEBOUNCE_MS: &str = "LUNCHSYNC_RECOMPUTE_DEBOUNCE_MS";
pub const ENV_WATCH_REMOTE_CHANGES: &str = "LUNCHSYNC_WATCH_REMOTE_CHANGES";
pub const ENV_LOG_FILTER: &str = "LUNCHSYNC_LOG_FILTER";
pub const ENV_LOG_JSON: &str = "LUNCHSYNC_LOG_JSON";

const ALL_ENV_VARS: [&str; 7] = [
    ENV_STORE_TIMEOUT_MS,
    ENV_STORE_RETRY_ATTEMPTS,
    ENV_STORE_RETRY_BACKOFF_MS,
    ENV_RECOMPUTE_DEBOUNCE_MS,
    ENV_WATCH_REMOTE_CHANGES,
    ENV_LOG_FILTER,
    ENV_LOG_JSON,
];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `LunchError::Config` if a variable or the probed file is invalid.
pub fn load() -> Result<AppConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "No usable environment configuration, trying file");
            match probe_config_paths() {
                Some(path) => load_from_file(Some(path)),
                None => {
                    tracing::info!("No config file found, using defaults");
                    Ok(AppConfig::default())
                }
            }
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `LunchError::Config` if no `LUNCHSYNC_*` variable is set or a
/// value cannot be parsed.
pub fn load_from_env() -> Result<AppConfig> {
    if !ALL_ENV_VARS.iter().any(|key| std::env::var_os(key).is_some()) {
        return Err(LunchError::Config("No LUNCHSYNC_* environment variables set".to_string()));
    }

    let mut config = AppConfig::default();

    if let Some(ms) = env_parse(ENV_STORE_TIMEOUT_MS, "store timeout")? {
        config.store.operation_timeout_ms = ms;
    }
    if let Some(attempts) = env_parse(ENV_STORE_RETRY_ATTEMPTS, "retry attempts")? {
        config.store.retry_attempts = attempts;
    }
    if let Some(ms) = env_parse(ENV_STORE_RETRY_BACKOFF_MS, "retry backoff")? {
        config.store.retry_backoff_ms = ms;
    }
    if let Some(ms) = env_parse(ENV_RECOMPUTE_DEBOUNCE_MS, "recompute debounce")? {
        config.feasibility.recompute_debounce_ms = ms;
    }
    config.feasibility.watch_remote_changes =
        env_bool(ENV_WATCH_REMOTE_CHANGES, config.feasibility.watch_remote_changes);

    if let Ok(filter) = std::env::var(ENV_LOG_FILTER) {
        config.logging.filter = filter;
    }
    config.logging.json = env_bool(ENV_LOG_JSON, config.logging.json);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `LunchError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(LunchError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            LunchError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| LunchError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration content; the format follows the file extension.
fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| LunchError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| LunchError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(LunchError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a config file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> [PathBuf; 8] {
    [
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("lunchsync.json"),
        dir.join("lunchsync.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

/// Parse an optional numeric variable
///
/// # Errors
/// Returns `LunchError::Config` if the variable is set but not a number.
fn env_parse<T>(key: &str, what: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| LunchError::Config(format!("Invalid {what} in {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for key in ALL_ENV_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        for (i, raw) in ["1", "true", "yes", "on", "TRUE"].iter().enumerate() {
            let key = format!("LUNCHSYNC_TEST_BOOL_TRUE_{i}");
            std::env::set_var(&key, raw);
            assert!(env_bool(&key, false), "{raw} should parse as true");
            std::env::remove_var(&key);
        }

        for (i, raw) in ["0", "false", "no", "off"].iter().enumerate() {
            let key = format!("LUNCHSYNC_TEST_BOOL_FALSE_{i}");
            std::env::set_var(&key, raw);
            assert!(!env_bool(&key, true), "{raw} should parse as false");
            std::env::remove_var(&key);
        }

        std::env::remove_var("LUNCHSYNC_TEST_BOOL_MISSING");
        assert!(env_bool("LUNCHSYNC_TEST_BOOL_MISSING", true));
        assert!(!env_bool("LUNCHSYNC_TEST_BOOL_MISSING", false));
    }

    #[test]
    fn test_load_from_env_overrides_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_STORE_TIMEOUT_MS, "750");
        std::env::set_var(ENV_RECOMPUTE_DEBOUNCE_MS, "10");
        std::env::set_var(ENV_WATCH_REMOTE_CHANGES, "off");
        std::env::set_var(ENV_LOG_FILTER, "debug");

        let config = load_from_env().expect("env config should load");
        assert_eq!(config.store.operation_timeout_ms, 750);
        assert_eq!(config.store.retry_attempts, AppConfig::default().store.retry_attempts);
        assert_eq!(config.feasibility.recompute_debounce_ms, 10);
        assert!(!config.feasibility.watch_remote_changes);
        assert_eq!(config.logging.filter, "debug");
        assert!(!config.logging.json);

        clear_env();
    }

    #[test]
    fn test_load_from_env_without_variables() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, LunchError::Config(_)), "Should be a Config error");
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_STORE_RETRY_ATTEMPTS, "several");

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, LunchError::Config(ref msg) if msg.contains(ENV_STORE_RETRY_ATTEMPTS)));

        clear_env();
    }

    #[test]
    fn test_parse_config_json() {
        let json_content = r#"{
            "store": { "operation_timeout_ms": 1000, "retry_attempts": 5 },
            "feasibility": { "recompute_debounce_ms": 20 }
        }"#;

        let config = parse_config(json_content, Path::new("test.json")).unwrap();
        assert_eq!(config.store.operation_timeout_ms, 1000);
        assert_eq!(config.store.retry_attempts, 5);
        assert_eq!(config.feasibility.recompute_debounce_ms, 20);
        assert!(config.feasibility.watch_remote_changes);
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_content = r#"
[store]
operation_timeout_ms = 2000

[logging]
filter = "warn"
json = true
"#;

        let config = parse_config(toml_content, Path::new("test.toml")).unwrap();
        assert_eq!(config.store.operation_timeout_ms, 2000);
        assert_eq!(config.logging.filter, "warn");
        assert!(config.logging.json);
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("some content", Path::new("test.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }

    #[test]
    fn test_load_from_file_not_found() {
        let err = load_from_file(Some(PathBuf::from("/nonexistent/config.json"))).unwrap_err();
        assert!(matches!(err, LunchError::Config(_)), "Should be a Config error");
    }
}
