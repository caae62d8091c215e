//! Availability store adapters
//!
//! - [`InMemoryStore`]: process-local real-time store with subscriptions
//! - [`RetryingStore`]: decorator retrying transient store failures

pub mod memory;
pub mod retrying;

pub use memory::InMemoryStore;
pub use retrying::{RetryConfig, RetryingStore};
