//! Application constants
//!
//! Store layout and default tuning values shared by every crate.

/// Separator between path segments in store addresses.
pub const PATH_SEPARATOR: char = '/';

/// Characters a store key may not contain.
pub const RESERVED_KEY_CHARS: [char; 6] = ['/', '.', '#', '$', '[', ']'];

// Store access defaults
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_STORE_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_STORE_RETRY_BACKOFF_MS: u64 = 100;

// Feasibility watcher defaults
pub const DEFAULT_RECOMPUTE_DEBOUNCE_MS: u64 = 50;
pub const DEFAULT_WATCHER_JOIN_TIMEOUT_MS: u64 = 5_000;
/// How long a local write waits to be claimed by the watcher before it is
/// dropped.
pub const LOCAL_WRITE_TTL_MS: u64 = 10_000;

// Logging defaults
pub const DEFAULT_LOG_FILTER: &str = "info";
