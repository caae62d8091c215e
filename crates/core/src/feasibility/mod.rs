//! Lunch place feasibility domain

pub mod coordinator;
pub mod decode;
pub mod engine;
mod local_writes;

pub use coordinator::*;
pub use engine::*;
