//! Domain types and models

pub mod place;
pub mod snapshot;
pub mod store;
pub mod user;

pub use place::Place;
pub use snapshot::{AvailabilitySnapshot, FeasibilityMap};
pub use store::{ChangeEvent, ChangeKind, Collection, StorePath};
pub use user::{UserId, UserIdentity};

use crate::constants::RESERVED_KEY_CHARS;
use crate::errors::{LunchError, Result};

/// Validate a string for use as a single store key segment.
///
/// The key is kept verbatim. `what` names the value in error messages.
pub(crate) fn validate_key(raw: &str, what: &str) -> Result<String> {
    if raw.trim().is_empty() {
        return Err(LunchError::InvalidInput(format!("{what} must not be empty")));
    }
    if let Some(c) = raw.chars().find(|c| RESERVED_KEY_CHARS.contains(c)) {
        return Err(LunchError::InvalidInput(format!(
            "{what} '{raw}' contains reserved character '{c}'"
        )));
    }
    Ok(raw.to_string())
}
