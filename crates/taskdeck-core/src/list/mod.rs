//! Task list module.
//!
//! Contains the manager that orchestrates repository calls from user
//! intent and owns the view-local task cache.

mod manager;

#[cfg(test)]
mod manager_test;

// Re-export public API
pub use manager::{LoadState, TaskListManager};
