//! In-process identity provider
//!
//! Holds the identity handed over by the sign-in flow. The sign-in UI calls
//! [`SessionIdentity::sign_in`] / [`SessionIdentity::sign_out`]; the
//! coordinator reads it through [`IdentityProvider`].

use lunchsync_core::IdentityProvider;
use lunchsync_domain::UserIdentity;
use parking_lot::RwLock;
use tracing::info;

#[derive(Debug, Default)]
pub struct SessionIdentity {
    current: RwLock<Option<UserIdentity>>,
}

impl SessionIdentity {
    /// An anonymous session.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session already signed in as `identity`.
    pub fn signed_in(identity: UserIdentity) -> Self {
        Self { current: RwLock::new(Some(identity)) }
    }

    /// Replace the current identity. Returns the previous one, if any.
    pub fn sign_in(&self, identity: UserIdentity) -> Option<UserIdentity> {
        info!(uid = %identity.uid, "User signed in");
        self.current.write().replace(identity)
    }

    /// Forget the current user and return it.
    pub fn sign_out(&self) -> Option<UserIdentity> {
        let previous = self.current.write().take();
        if let Some(identity) = &previous {
            info!(uid = %identity.uid, "User signed out");
        }
        previous
    }

    /// Whether a user is signed in.
    pub fn is_signed_in(&self) -> bool {
        self.current.read().is_some()
    }
}

impl IdentityProvider for SessionIdentity {
    fn current_user(&self) -> Option<UserIdentity> {
        self.current.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use lunchsync_domain::UserId;

    use super::*;

    fn alice() -> UserIdentity {
        UserIdentity::new(UserId::parse("alice").unwrap()).with_display_name("Alice")
    }

    #[test]
    fn tracks_sign_in_and_out() {
        let identity = SessionIdentity::new();
        assert!(identity.current_user().is_none());

        assert!(identity.sign_in(alice()).is_none());
        assert!(identity.is_signed_in());
        assert_eq!(identity.current_user(), Some(alice()));

        assert_eq!(identity.sign_out(), Some(alice()));
        assert!(identity.current_user().is_none());
        assert!(identity.sign_out().is_none());
    }
}
