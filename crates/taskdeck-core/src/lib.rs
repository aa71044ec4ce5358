//! Core domain layer for taskdeck.
//!
//! This crate holds the domain models (tasks, sessions), the repository
//! and store traits that decouple the UI from the hosted backend, and the
//! task-list manager that orchestrates CRUD calls and owns the view-local
//! cache. It performs no IO of its own; concrete backends live in
//! `taskdeck-infrastructure`.

pub mod error;
pub mod list;
pub mod notice;
pub mod session;
pub mod task;

pub use error::{Result, TaskdeckError};
pub use list::{LoadState, TaskListManager};
pub use notice::{Notice, NoticeLevel};
pub use session::{AuthUser, Credentials, Session, SessionStore};
pub use task::{ChangeEvent, ChangeFeed, ChangeKind, NewTask, Task, TaskRepository};
