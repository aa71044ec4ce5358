//! Task repository and change-feed traits.
//!
//! Defines the interfaces for the remote task row-store.

use super::model::{ChangeEvent, Task};
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::broadcast;
use uuid::Uuid;

/// An abstract repository for the hosted task table.
///
/// This trait defines the contract for the remote row-store, decoupling
/// the task-list manager from the concrete backend (REST API in
/// production, in-memory mocks in tests). Every operation runs in the
/// backend's authorization context; the client never computes or checks
/// row ownership itself.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Lists all visible tasks, ordered by creation time descending.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Task>)`: The backend's current truth for this user
    /// - `Err(_)`: The remote call failed (network, authorization, policy)
    async fn list(&self) -> Result<Vec<Task>>;

    /// Creates a task with the completion flag cleared.
    ///
    /// # Arguments
    ///
    /// * `title` - The task title; must be non-empty
    ///
    /// # Errors
    ///
    /// Returns an error for an empty title or a backend rejection.
    async fn insert(&self, title: &str) -> Result<()>;

    /// Sets the completion flag of a task by id.
    ///
    /// # Errors
    ///
    /// Returns an error if no such row exists or the backend rejects the
    /// update.
    async fn set_complete(&self, id: Uuid, is_complete: bool) -> Result<()>;

    /// Removes a task by id.
    ///
    /// # Errors
    ///
    /// Returns an error if no such row exists or the backend rejects the
    /// deletion.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// A push channel delivering "something changed" signals for the task
/// table.
///
/// Subscribing hands out a broadcast receiver; dropping the receiver is
/// the teardown, and no event can be observed after disposal. A lagged
/// receiver still owes its owner a refresh - the channel contract is
/// at-least-once with coalescing, never exactly-once.
pub trait ChangeFeed: Send + Sync {
    /// Registers a new subscriber for change events.
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}
