//! Task domain module.
//!
//! This module contains the task domain models, the repository interface
//! for the remote row-store, and the change-feed interface used for live
//! refresh.
//!
//! # Module Structure
//!
//! - `model`: Task domain models (`Task`, `NewTask`, change events)
//! - `repository`: Repository and change-feed traits

mod model;
mod repository;

// Re-export public API
pub use model::{ChangeEvent, ChangeKind, NewTask, Task};
pub use repository::{ChangeFeed, TaskRepository};
