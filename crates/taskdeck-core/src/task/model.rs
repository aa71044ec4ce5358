//! Task domain model.
//!
//! This module contains the core Task entity and the change-notification
//! value types in the application's domain layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A to-do item row as stored by the backend.
///
/// `id`, `created_at` and `user_id` are assigned by the backend at insert
/// time and never change; `title` is set at creation and not editable in
/// this design. The completion flag is the only mutable field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub is_complete: bool,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
}

/// Insert body for a new task.
///
/// The owning user and the timestamps are bound by the backend's
/// authorization context, so the client sends only the title and the
/// initial completion flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub is_complete: bool,
}

impl NewTask {
    /// Creates an insert body with the completion flag cleared.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            is_complete: false,
        }
    }
}

/// The kind of row change reported by the backend feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A change notification for the watched task table.
///
/// Carries no row payload: the only guaranteed consequence of receiving
/// one is that a refresh is warranted. Delivery is at-least-once and may
/// coalesce or reorder relative to locally issued mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_deserializes_from_backend_row() {
        let row = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "title": "Buy milk",
            "is_complete": false,
            "created_at": "2025-03-01T09:30:00.123456+00:00",
            "user_id": "6ba7b810-9dad-11d1-80b4-00c04fd430c8"
        }"#;

        let task: Task = serde_json::from_str(row).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert!(!task.is_complete);
        assert_eq!(
            task.id.to_string(),
            "550e8400-e29b-41d4-a716-446655440000"
        );
    }

    #[test]
    fn new_task_serializes_only_client_fields() {
        let body = serde_json::to_value(NewTask::new("Buy milk")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "title": "Buy milk", "is_complete": false })
        );
    }

    #[test]
    fn change_kind_uses_backend_casing() {
        assert_eq!(
            serde_json::from_str::<ChangeKind>("\"INSERT\"").unwrap(),
            ChangeKind::Insert
        );
        assert_eq!(
            serde_json::from_str::<ChangeKind>("\"DELETE\"").unwrap(),
            ChangeKind::Delete
        );
    }
}
