//! Backend-facing implementations for taskdeck.
//!
//! Everything in this crate talks to the hosted backend: configuration
//! from the environment, the auth client and session store, the REST
//! task repository, and the realtime change feed. The traits these types
//! implement live in `taskdeck-core`.

pub mod auth;
pub mod config;
pub mod realtime;
pub mod rest;

pub use auth::{AuthClient, HostedSessionStore};
pub use config::BackendConfig;
pub use realtime::RealtimeFeed;
pub use rest::RestTaskRepository;
