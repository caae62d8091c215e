//! # LunchSync Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Store adapters (in-memory real-time store, retry decorator)
//! - Identity and presentation adapters
//! - Background workers (feasibility watcher, session mirror)
//! - Configuration loading and logging setup
//!
//! ## Architecture
//! - Implements traits defined in `lunchsync-core`
//! - Depends on `lunchsync-domain` and `lunchsync-core`
//! - Contains all code with side effects (tasks, globals, files)

pub mod config;
pub mod context;
pub mod identity;
pub mod observability;
pub mod presentation;
pub mod store;
pub mod sync;

// Re-export commonly used items
pub use context::{AppContext, ContextError};
pub use identity::SessionIdentity;
pub use observability::init_logging;
pub use presentation::{PresentationEvent, RecordingPresenter};
pub use store::{InMemoryStore, RetryConfig, RetryingStore};
pub use sync::{FeasibilityWatcher, FeasibilityWatcherConfig, SessionMirror, WorkerError};
