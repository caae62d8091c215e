//! Candidate lunch places

use std::fmt;

use serde::{Deserialize, Serialize};

use super::validate_key;
use crate::errors::Result;

/// A candidate place users vote availability on.
///
/// The name doubles as a store key, so it is validated on construction and
/// store-reserved characters are rejected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Place(String);

impl Place {
    /// Parse and validate a place name.
    ///
    /// # Errors
    /// Returns `LunchError::InvalidInput` for empty names or names containing
    /// `/`, `.`, `#`, `$`, `[` or `]`.
    pub fn parse(raw: &str) -> Result<Self> {
        validate_key(raw, "place name").map(Self)
    }

    /// Parse a name typed by a user: surrounding whitespace is dropped.
    ///
    /// Keys read back from the store go through [`Place::parse`] so that
    /// write-backs land on the same key.
    ///
    /// # Errors
    /// Same as [`Place::parse`].
    pub fn from_input(raw: &str) -> Result<Self> {
        Self::parse(raw.trim())
    }

    /// The name as stored.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Place {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Place {
    type Error = crate::errors::LunchError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Place> for String {
    fn from(place: Place) -> Self {
        place.0
    }
}
