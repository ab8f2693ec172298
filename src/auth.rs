//! Authentication provider seam.
//!
//! Sign-in, token issuance, and auth-state notifications are owned by an
//! external provider. The client talks to it through [`AuthProvider`] so the
//! provider can be swapped out (browser bridge, device flow, test fake).

use crate::error::AuthError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tokio::sync::watch;
use tracing::{info, instrument};

/// An identity issued by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Opaque provider-assigned user id.
    pub uid: String,
    /// Whether this identity was created through the anonymous sign-in path.
    pub is_anonymous: bool,
}

impl AuthUser {
    /// Creates a registered (non-anonymous) identity.
    pub fn registered(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            is_anonymous: false,
        }
    }

    /// Creates a guest identity.
    pub fn guest(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            is_anonymous: true,
        }
    }
}

/// External authentication collaborator.
///
/// Implementations must broadcast every identity change on the channel
/// returned by [`AuthProvider::subscribe`], including changes not triggered
/// through this trait's own methods.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Returns the currently signed-in identity, if any.
    fn current_user(&self) -> Option<AuthUser>;

    /// Obtains a fresh bearer token for the current identity.
    async fn id_token(&self) -> Result<String, AuthError>;

    /// Signs in through the provider's interactive flow.
    async fn sign_in(&self) -> Result<AuthUser, AuthError>;

    /// Signs in anonymously.
    async fn sign_in_anonymously(&self) -> Result<AuthUser, AuthError>;

    /// Signs out the current identity.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Subscribes to auth-state notifications.
    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>>;
}

/// In-process provider with a fixed uid and token.
///
/// Backs the CLI against development servers and stands in for the real
/// provider in tests. Identity changes, including [`StaticAuth::set_user`]
/// calls made from outside, are broadcast like real provider notifications.
#[derive(Debug)]
pub struct StaticAuth {
    uid: String,
    token: String,
    state: Mutex<Option<AuthUser>>,
    tx: watch::Sender<Option<AuthUser>>,
}

impl StaticAuth {
    /// Creates a signed-out provider that will issue the given uid and token.
    #[instrument(skip_all)]
    pub fn new(uid: impl Into<String>, token: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            uid: uid.into(),
            token: token.into(),
            state: Mutex::new(None),
            tx,
        }
    }

    /// Replaces the current identity and broadcasts the change.
    ///
    /// Simulates an auth-state notification arriving from outside the
    /// client's own sign-in and sign-out calls.
    pub fn set_user(&self, user: Option<AuthUser>) {
        *self.state.lock().expect("auth state poisoned") = user.clone();
        self.tx.send_replace(user);
    }
}

#[async_trait]
impl AuthProvider for StaticAuth {
    fn current_user(&self) -> Option<AuthUser> {
        self.state.lock().expect("auth state poisoned").clone()
    }

    async fn id_token(&self) -> Result<String, AuthError> {
        if self.current_user().is_none() {
            return Err(AuthError::new("no current user to issue a token for"));
        }
        Ok(self.token.clone())
    }

    #[instrument(skip(self))]
    async fn sign_in(&self) -> Result<AuthUser, AuthError> {
        let user = AuthUser::registered(self.uid.clone());
        info!(uid = %user.uid, "Static sign-in");
        self.set_user(Some(user.clone()));
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn sign_in_anonymously(&self) -> Result<AuthUser, AuthError> {
        let user = AuthUser::guest(self.uid.clone());
        info!(uid = %user.uid, "Static anonymous sign-in");
        self.set_user(Some(user.clone()));
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> Result<(), AuthError> {
        info!("Static sign-out");
        self.set_user(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_token_requires_identity() {
        let auth = StaticAuth::new("u1", "tok");
        assert!(auth.id_token().await.is_err());

        auth.sign_in().await.expect("Sign-in failed");
        assert_eq!(auth.id_token().await.expect("Token failed"), "tok");
    }

    #[tokio::test]
    async fn test_sign_in_broadcasts() {
        let auth = StaticAuth::new("u1", "tok");
        let mut rx = auth.subscribe();

        auth.sign_in_anonymously().await.expect("Sign-in failed");
        rx.changed().await.expect("Channel closed");
        let user = rx.borrow_and_update().clone().expect("No user broadcast");
        assert!(user.is_anonymous);
        assert_eq!(user.uid, "u1");
    }
}
