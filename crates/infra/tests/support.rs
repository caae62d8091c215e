#![allow(dead_code)]

use std::time::Duration;

use lunchsync_domain::{AppConfig, Place, UserId, UserIdentity};

pub fn place(name: &str) -> Place {
    Place::parse(name).expect("valid place name")
}

pub fn identity(uid: &str) -> UserIdentity {
    UserIdentity::new(UserId::parse(uid).expect("valid uid"))
}

/// Config tuned for tests: short timeouts, no retry delay.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.store.operation_timeout_ms = 1_000;
    config.store.retry_backoff_ms = 1;
    config.feasibility.recompute_debounce_ms = 5;
    config.feasibility.join_timeout_ms = 1_000;
    config
}

/// Poll `condition` until it holds or `timeout` elapses.
pub async fn eventually(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
