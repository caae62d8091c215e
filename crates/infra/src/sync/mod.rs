//! Background workers that keep sessions in step with the shared store
//!
//! - `FeasibilityWatcher`: recomputes feasibility when other sessions change
//!   places, availability or attendance
//! - `SessionMirror`: forwards store changes to the presentation layer
//!
//! Both workers track their join handle, cancel explicitly on `stop()` and
//! bound the join with a timeout. Dropping a running worker cancels it.

mod errors;
pub mod feasibility_watcher;
pub mod session_mirror;

pub use errors::WorkerError;
pub use feasibility_watcher::{FeasibilityWatcher, FeasibilityWatcherConfig};
pub use session_mirror::SessionMirror;
