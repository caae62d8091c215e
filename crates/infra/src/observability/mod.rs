//! Observability infrastructure for logging and worker metrics
//!
//! - [`logging`] installs the global `tracing` subscriber
//! - [`metrics`] holds lock-free counters for the background workers

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::{WorkerMetrics, WorkerMetricsSnapshot};
