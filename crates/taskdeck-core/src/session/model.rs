//! Session domain model.
//!
//! This module contains the core Session entity that represents an
//! authenticated backend session in the application's domain layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated backend session.
///
/// Beyond carrying the bearer token for data-plane requests, the session
/// is opaque to this application: the shell only cares whether one is
/// present or absent. The wire shape follows the auth provider's token
/// response, so it deserializes straight off the sign-in call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token sent with every REST request
    pub access_token: String,
    /// Token used to obtain a fresh access token after expiry
    pub refresh_token: String,
    /// Access token lifetime in seconds
    #[serde(default)]
    pub expires_in: u64,
    /// The authenticated user
    pub user: AuthUser,
}

/// The authenticated user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Credentials submitted from the sign-in screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}
