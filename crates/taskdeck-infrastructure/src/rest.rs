//! REST-backed task repository.
//!
//! Implements [`TaskRepository`] against the backend's row API. The
//! backend enforces row-level authorization itself: every request runs
//! under the current session's bearer token and the client never filters
//! by owner.

use crate::config::BackendConfig;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use taskdeck_core::{NewTask, Result, Session, Task, TaskRepository, TaskdeckError};
use tokio::sync::watch;
use uuid::Uuid;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Task repository over the backend's REST row API.
pub struct RestTaskRepository {
    client: Client,
    config: BackendConfig,
    session: watch::Receiver<Option<Session>>,
}

impl RestTaskRepository {
    /// Creates a repository bound to the session store's watch channel.
    ///
    /// The bearer token is read per request, so a sign-in that happens
    /// after construction is picked up automatically.
    pub fn new(config: BackendConfig, session: watch::Receiver<Option<Session>>) -> Self {
        Self {
            client: Client::new(),
            config,
            session,
        }
    }

    fn tasks_url(&self) -> String {
        format!("{}/tasks", self.config.rest_url())
    }

    fn access_token(&self) -> Result<String> {
        self.session
            .borrow()
            .as_ref()
            .map(|session| session.access_token.clone())
            .ok_or_else(|| TaskdeckError::auth("no active session"))
    }

    fn authed(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        Ok(builder
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.access_token()?)
            .timeout(REQUEST_TIMEOUT))
    }

    async fn expect_success(response: Response) -> Result<Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TaskdeckError::http(status.as_u16(), body));
        }
        Ok(response)
    }
}

#[async_trait]
impl TaskRepository for RestTaskRepository {
    async fn list(&self) -> Result<Vec<Task>> {
        let request = self
            .authed(self.client.get(self.tasks_url()))?
            .query(&[("select", "*"), ("order", "created_at.desc")]);

        let response = Self::expect_success(request.send().await?).await?;
        Ok(response.json::<Vec<Task>>().await?)
    }

    async fn insert(&self, title: &str) -> Result<()> {
        if title.trim().is_empty() {
            return Err(TaskdeckError::validation("task title must not be empty"));
        }

        let request = self
            .authed(self.client.post(self.tasks_url()))?
            .header("Prefer", "return=minimal")
            .json(&vec![NewTask::new(title)]);

        Self::expect_success(request.send().await?).await?;
        Ok(())
    }

    async fn set_complete(&self, id: Uuid, is_complete: bool) -> Result<()> {
        // return=representation so that an update matching zero rows is
        // distinguishable from a successful one.
        let request = self
            .authed(self.client.patch(self.tasks_url()))?
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({ "is_complete": is_complete }));

        let response = Self::expect_success(request.send().await?).await?;
        let updated = response.json::<Vec<Task>>().await?;
        if updated.is_empty() {
            return Err(TaskdeckError::not_found("task", id.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let request = self
            .authed(self.client.delete(self.tasks_url()))?
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation");

        let response = Self::expect_success(request.send().await?).await?;
        let deleted = response.json::<Vec<Task>>().await?;
        if deleted.is_empty() {
            return Err(TaskdeckError::not_found("task", id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_repository() -> RestTaskRepository {
        let (_tx, rx) = watch::channel(None);
        RestTaskRepository::new(BackendConfig::new("https://xyz.supabase.co", "anon"), rx)
    }

    #[test]
    fn tasks_url_targets_the_row_api() {
        let repository = test_repository();
        assert_eq!(
            repository.tasks_url(),
            "https://xyz.supabase.co/rest/v1/tasks"
        );
    }

    #[tokio::test]
    async fn requests_require_an_active_session() {
        let repository = test_repository();
        let err = repository.list().await.unwrap_err();
        assert!(err.is_auth(), "expected an auth error, got {err:?}");
    }

    #[tokio::test]
    async fn insert_rejects_an_empty_title_without_a_request() {
        // Validation fires before the session check, so a blank title
        // never reaches the wire even when signed out.
        let repository = test_repository();
        let err = repository.insert("   ").await.unwrap_err();
        assert!(matches!(err, TaskdeckError::Validation(_)));
    }
}
