//! Configuration loading
//!
//! Loads [`AppConfig`](lunchsync_domain::AppConfig) from environment
//! variables and JSON/TOML files.

pub mod loader;

pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
