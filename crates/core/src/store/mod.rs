//! Availability store boundary

pub mod ports;

pub use ports::*;
