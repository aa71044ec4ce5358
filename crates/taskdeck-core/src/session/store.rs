//! Session store trait.
//!
//! Defines the interface for tracking the current authenticated session.

use super::model::{Credentials, Session};
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::watch;

/// An abstract store for the single current-session value.
///
/// This trait decouples the shell from the concrete auth provider. The
/// store owns the latest session value and publishes every change
/// (sign-in, sign-out) through a [`watch`] channel, so subscribers always
/// observe the most recent state regardless of when they subscribed -
/// there is deliberately no ordering guarantee between an initial read
/// and the first change notification, and consumers must apply the value
/// idempotently.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the presently known session, if any.
    async fn current_session(&self) -> Option<Session>;

    /// Subscribes to session changes.
    ///
    /// The receiver yields the latest value on every sign-in and
    /// sign-out. Dropping the receiver tears the subscription down; no
    /// notification is delivered past that point.
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;

    /// Authenticates with the backend and publishes the new session.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the credentials or the
    /// call fails; no session change is published in that case.
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session>;

    /// Terminates the current session.
    ///
    /// Subscribers are notified with `None`. The local session is
    /// discarded even if revocation on the provider side fails.
    async fn sign_out(&self) -> Result<()>;
}
