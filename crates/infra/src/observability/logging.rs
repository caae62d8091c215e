//! Global `tracing` subscriber setup

use lunchsync_domain::{LoggingConfig, LunchError, Result};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber
///
/// `RUST_LOG` takes precedence over `config.filter` when set. Call once per
/// process; a second call fails because a global subscriber already exists.
///
/// # Errors
/// Returns `LunchError::Config` if the filter directive is invalid or a
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter).map_err(|e| {
            LunchError::Config(format!("Invalid log filter '{}': {e}", config.filter))
        })?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| LunchError::Config(format!("Failed to install subscriber: {e}")))?;

    tracing::debug!(filter = %config.filter, json = config.json, "Logging initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_filter() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig { filter: "lunchsync=notalevel".to_string(), json: false };
        assert!(matches!(init_logging(&config), Err(LunchError::Config(_))));
    }
}
