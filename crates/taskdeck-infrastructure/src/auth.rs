//! Auth provider client and session store.
//!
//! [`AuthClient`] speaks the hosted auth API (password grant and logout);
//! [`HostedSessionStore`] wraps it and owns the single current-session
//! value that the shell subscribes to.

use crate::config::BackendConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use taskdeck_core::{Credentials, Result, Session, SessionStore, TaskdeckError};
use tokio::sync::watch;

const AUTH_TIMEOUT: Duration = Duration::from_secs(30);

/// REST client for the hosted auth provider.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    config: BackendConfig,
}

impl AuthClient {
    /// Creates a client for the configured backend.
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Exchanges credentials for a session via the password grant.
    ///
    /// # Errors
    ///
    /// Returns `Auth` when the provider rejects the credentials and
    /// `Network`/`Serialization` for transport or decoding failures.
    pub async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<Session> {
        let url = format!("{}/token?grant_type=password", self.config.auth_url());

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .json(credentials)
            .timeout(AUTH_TIMEOUT)
            .send()
            .await
            .map_err(|e| TaskdeckError::network(format!("sign-in request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TaskdeckError::auth(format!(
                "sign-in rejected ({status}): {body}"
            )));
        }

        Ok(response.json::<Session>().await?)
    }

    /// Revokes the session's tokens on the provider.
    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        let url = format!("{}/logout", self.config.auth_url());

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
            .timeout(AUTH_TIMEOUT)
            .send()
            .await
            .map_err(|e| TaskdeckError::network(format!("sign-out request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaskdeckError::auth(format!(
                "sign-out rejected ({status})"
            )));
        }

        Ok(())
    }
}

/// Session store backed by the hosted auth provider.
///
/// Owns the latest session value in a [`watch`] channel. Sessions are
/// held in memory only; there is no persisted local state, so every
/// program start begins signed out.
pub struct HostedSessionStore {
    auth: AuthClient,
    session: watch::Sender<Option<Session>>,
}

impl HostedSessionStore {
    pub fn new(auth: AuthClient) -> Self {
        let (session, _) = watch::channel(None);
        Self { auth, session }
    }
}

#[async_trait]
impl SessionStore for HostedSessionStore {
    async fn current_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session> {
        let session = self.auth.sign_in_with_password(credentials).await?;
        tracing::info!(user = %session.user.id, "signed in");
        self.session.send_replace(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        // Publish the absence first: the local session is discarded even
        // if revocation on the provider side fails.
        let previous = self.session.send_replace(None);
        if let Some(session) = previous {
            if let Err(err) = self.auth.sign_out(&session.access_token).await {
                tracing::warn!("failed to revoke session on sign-out: {err}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_deserializes_from_token_response() {
        // Trimmed-down shape of the provider's password-grant response;
        // unknown fields are ignored.
        let body = r#"{
            "access_token": "header.payload.signature",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "refresh-me",
            "user": {
                "id": "6ba7b810-9dad-11d1-80b4-00c04fd430c8",
                "aud": "authenticated",
                "email": "ada@example.com"
            }
        }"#;

        let session: Session = serde_json::from_str(body).unwrap();
        assert_eq!(session.access_token, "header.payload.signature");
        assert_eq!(session.expires_in, 3600);
        assert_eq!(session.user.email.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test]
    async fn store_starts_signed_out() {
        let store = HostedSessionStore::new(AuthClient::new(BackendConfig::new(
            "https://xyz.supabase.co",
            "anon",
        )));
        assert!(store.current_session().await.is_none());
        assert!(store.subscribe().borrow().is_none());
    }
}
