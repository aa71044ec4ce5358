//! Backend connection configuration.
//!
//! The only configuration the client needs is the backend endpoint and
//! its anon API key, read from environment variables.

use std::env;
use taskdeck_core::{Result, TaskdeckError};

/// Environment variable holding the backend base URL.
pub const API_URL_VAR: &str = "TASKDECK_API_URL";
/// Environment variable holding the backend anon key.
pub const API_KEY_VAR: &str = "TASKDECK_API_KEY";

/// Connection credentials for the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co` (no trailing slash)
    pub url: String,
    /// The project's anon API key, sent as the `apikey` header
    pub anon_key: String,
}

impl BackendConfig {
    /// Creates a configuration from explicit values.
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    /// Loads the configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error naming the missing variable.
    pub fn from_env() -> Result<Self> {
        let url = env::var(API_URL_VAR)
            .map_err(|_| TaskdeckError::config(format!("{API_URL_VAR} is not set")))?;
        let anon_key = env::var(API_KEY_VAR)
            .map_err(|_| TaskdeckError::config(format!("{API_KEY_VAR} is not set")))?;
        Ok(Self::new(url, anon_key))
    }

    /// Base URL of the auth provider endpoints.
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.url)
    }

    /// Base URL of the row-store REST endpoints.
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url)
    }

    /// Websocket URL of the realtime change-notification endpoint.
    pub fn realtime_url(&self) -> String {
        let ws_base = if let Some(rest) = self.url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.url.clone()
        };
        format!(
            "{ws_base}/realtime/v1/websocket?apikey={}&vsn=1.0.0",
            self.anon_key
        )
    }
}
