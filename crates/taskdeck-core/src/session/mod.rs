//! Session domain module.
//!
//! This module contains the session-related domain models and the store
//! interface the shell uses to track the authenticated state.
//!
//! # Module Structure
//!
//! - `model`: Session domain models (`Session`, `AuthUser`, `Credentials`)
//! - `store`: Store trait for session tracking (`SessionStore`)

mod model;
mod store;

// Re-export public API
pub use model::{AuthUser, Credentials, Session};
pub use store::SessionStore;
