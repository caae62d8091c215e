//! Signed-in identity and presentation boundaries

pub mod ports;

pub use ports::*;
