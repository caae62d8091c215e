//! User identity types

use std::fmt;

use serde::{Deserialize, Serialize};

use super::validate_key;
use crate::errors::Result;

/// Opaque stable user identifier issued by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// # Errors
    /// Returns `LunchError::InvalidInput` if the identifier cannot be used as
    /// a store key.
    pub fn parse(raw: &str) -> Result<Self> {
        validate_key(raw, "user id").map(Self)
    }

    /// The identifier as stored.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = crate::errors::LunchError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// Signed-in user as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub uid: UserId,
    pub display_name: Option<String>,
    /// Profile picture shown next to the user name
    pub photo_url: Option<String>,
}

impl UserIdentity {
    /// An identity with no profile details.
    pub fn new(uid: UserId) -> Self {
        Self { uid, display_name: None, photo_url: None }
    }

    /// Set the name shown next to the user.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Set the profile picture URL.
    pub fn with_photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }
}
