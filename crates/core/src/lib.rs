//! # LunchSync Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The feasibility engine (which places work for everyone going)
//! - Port/adapter interfaces (traits) for the store, identity and presentation
//! - The `LunchCoordinator` use-case service
//!
//! ## Architecture Principles
//! - Only depends on `lunchsync-domain`
//! - No network, storage or UI code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod feasibility;
pub mod session;
pub mod store;

// Re-export specific items to avoid ambiguity
pub use feasibility::engine::{blocking_users, compute_feasibility, is_feasible};
pub use feasibility::{LunchCoordinator, SessionState};
pub use session::ports::{IdentityProvider, PresentationSink};
pub use store::ports::{AvailabilityStore, Subscription, SubscriptionHandle, SubscriptionSink};
