use crate::notice::Notice;
use crate::task::{Task, TaskRepository};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Fetch state of a task-list instance.
///
/// There is no error state: a failed fetch returns to `Ready` with the
/// previous (possibly empty) cache and surfaces a transient notice
/// instead of transitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No fetch has been issued yet.
    Uninitialized,
    /// A fetch is in flight.
    Loading,
    /// At least one fetch has concluded (successfully or not).
    Ready,
}

/// Orchestrates repository calls from user intent and owns the
/// view-local task cache.
///
/// The cache is an ordered snapshot of the backend's truth, replaced
/// wholesale on every successful fetch - never patched incrementally.
/// Mutations are not optimistic: the authoritative refresh arrives via
/// the change-notification channel, so the UI may lag a mutation by one
/// round-trip.
///
/// Every operation outcome emits exactly one [`Notice`] on the channel
/// handed to [`TaskListManager::new`]. If the receiving end is gone
/// (the view unmounted), notices are silently dropped.
pub struct TaskListManager {
    repository: Arc<dyn TaskRepository>,
    tasks: RwLock<Vec<Task>>,
    load_state: RwLock<LoadState>,
    notices: UnboundedSender<Notice>,
}

impl TaskListManager {
    /// Creates a manager over a repository backend.
    ///
    /// # Arguments
    ///
    /// * `repository` - The remote row-store
    /// * `notices` - Sink for per-operation outcome notices
    pub fn new(repository: Arc<dyn TaskRepository>, notices: UnboundedSender<Notice>) -> Self {
        Self {
            repository,
            tasks: RwLock::new(Vec::new()),
            load_state: RwLock::new(LoadState::Uninitialized),
            notices,
        }
    }

    /// Returns a snapshot of the cached tasks.
    pub async fn tasks(&self) -> Vec<Task> {
        self.tasks.read().await.clone()
    }

    /// Returns the current fetch state.
    pub async fn load_state(&self) -> LoadState {
        *self.load_state.read().await
    }

    /// Fetches the full list and replaces the cache wholesale.
    ///
    /// On failure the cache keeps whatever was last known and an error
    /// notice is emitted; loading always concludes. Two overlapping
    /// refreshes resolve last-writer-wins with no sequencing.
    pub async fn refresh(&self) {
        *self.load_state.write().await = LoadState::Loading;

        match self.repository.list().await {
            Ok(tasks) => {
                *self.tasks.write().await = tasks;
            }
            Err(err) => {
                tracing::warn!("task list fetch failed: {err}");
                self.notify(Notice::error("Error fetching tasks"));
            }
        }

        *self.load_state.write().await = LoadState::Ready;
    }

    /// Submits a new task.
    ///
    /// A submission whose trimmed title is empty is a no-op: no
    /// repository call is made and no notice is emitted. Returns `true`
    /// when the insert succeeded, which tells the view to clear its
    /// input field; on failure the input is left untouched for retry.
    pub async fn add(&self, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }

        match self.repository.insert(title).await {
            Ok(()) => {
                self.notify(Notice::success("Task added successfully!"));
                true
            }
            Err(err) => {
                tracing::warn!("task insert failed: {err}");
                self.notify(Notice::error("Error adding task"));
                false
            }
        }
    }

    /// Toggles a task's completion flag.
    ///
    /// Sends the logical negation of the task's current flag; the cache
    /// is not touched here.
    pub async fn toggle(&self, task: &Task) {
        match self
            .repository
            .set_complete(task.id, !task.is_complete)
            .await
        {
            Ok(()) => self.notify(Notice::success("Task updated!")),
            Err(err) => {
                tracing::warn!("task update failed for {}: {err}", task.id);
                self.notify(Notice::error("Error updating task"));
            }
        }
    }

    /// Deletes a task by id. Not optimistic, like [`toggle`](Self::toggle).
    pub async fn remove(&self, id: Uuid) {
        match self.repository.delete(id).await {
            Ok(()) => self.notify(Notice::success("Task deleted!")),
            Err(err) => {
                tracing::warn!("task delete failed for {id}: {err}");
                self.notify(Notice::error("Error deleting task"));
            }
        }
    }

    fn notify(&self, notice: Notice) {
        // A closed channel means the view was torn down; drop silently.
        let _ = self.notices.send(notice);
    }
}
