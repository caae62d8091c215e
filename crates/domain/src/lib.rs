//! # LunchSync Domain
//!
//! Business domain types and models for LunchSync.
//!
//! This crate contains:
//! - Domain data types (Place, UserId, AvailabilitySnapshot, FeasibilityMap)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Store layout constants
//!
//! ## Architecture
//! - No dependencies on other LunchSync crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
