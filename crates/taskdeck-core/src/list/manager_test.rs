#[cfg(test)]
mod tests {
    use crate::error::{Result, TaskdeckError};
    use crate::list::manager::{LoadState, TaskListManager};
    use crate::notice::{Notice, NoticeLevel};
    use crate::task::{Task, TaskRepository};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;
    use uuid::Uuid;

    // Mock TaskRepository for testing. Records every call so the tests
    // can assert exactly what reached the backend.
    struct MockTaskRepository {
        tasks: Mutex<Vec<Task>>,
        insert_titles: Mutex<Vec<String>>,
        set_complete_calls: Mutex<Vec<(Uuid, bool)>>,
        fail_list: AtomicBool,
        fail_insert: AtomicBool,
    }

    impl MockTaskRepository {
        fn new() -> Self {
            Self {
                tasks: Mutex::new(Vec::new()),
                insert_titles: Mutex::new(Vec::new()),
                set_complete_calls: Mutex::new(Vec::new()),
                fail_list: AtomicBool::new(false),
                fail_insert: AtomicBool::new(false),
            }
        }

        fn seed(&self, tasks: Vec<Task>) {
            *self.tasks.lock().unwrap() = tasks;
        }

        fn insert_titles(&self) -> Vec<String> {
            self.insert_titles.lock().unwrap().clone()
        }

        fn set_complete_calls(&self) -> Vec<(Uuid, bool)> {
            self.set_complete_calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TaskRepository for MockTaskRepository {
        async fn list(&self) -> Result<Vec<Task>> {
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(TaskdeckError::network("connection reset"));
            }
            let mut tasks = self.tasks.lock().unwrap().clone();
            tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(tasks)
        }

        async fn insert(&self, title: &str) -> Result<()> {
            if self.fail_insert.load(Ordering::SeqCst) {
                return Err(TaskdeckError::http(500, "insert rejected"));
            }
            self.insert_titles.lock().unwrap().push(title.to_string());
            let count = self.tasks.lock().unwrap().len();
            self.tasks.lock().unwrap().push(test_task(title, false, count));
            Ok(())
        }

        async fn set_complete(&self, id: Uuid, is_complete: bool) -> Result<()> {
            self.set_complete_calls
                .lock()
                .unwrap()
                .push((id, is_complete));
            let mut tasks = self.tasks.lock().unwrap();
            match tasks.iter_mut().find(|task| task.id == id) {
                Some(task) => {
                    task.is_complete = is_complete;
                    Ok(())
                }
                None => Err(TaskdeckError::not_found("task", id.to_string())),
            }
        }

        async fn delete(&self, id: Uuid) -> Result<()> {
            let mut tasks = self.tasks.lock().unwrap();
            let before = tasks.len();
            tasks.retain(|task| task.id != id);
            if tasks.len() == before {
                return Err(TaskdeckError::not_found("task", id.to_string()));
            }
            Ok(())
        }
    }

    fn test_task(title: &str, is_complete: bool, offset_secs: usize) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            is_complete,
            created_at: Utc
                .with_ymd_and_hms(2025, 3, 1, 9, 0, offset_secs as u32)
                .unwrap(),
            user_id: Uuid::new_v4(),
        }
    }

    fn setup() -> (
        Arc<MockTaskRepository>,
        TaskListManager,
        mpsc::UnboundedReceiver<Notice>,
    ) {
        let repository = Arc::new(MockTaskRepository::new());
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        let manager = TaskListManager::new(repository.clone(), notice_tx);
        (repository, manager, notice_rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Notice>) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Ok(notice) = rx.try_recv() {
            notices.push(notice);
        }
        notices
    }

    #[tokio::test]
    async fn add_inserts_single_task_with_flag_cleared() {
        let (repository, manager, mut notice_rx) = setup();

        let accepted = manager.add("Buy milk").await;

        assert!(accepted);
        assert_eq!(repository.insert_titles(), vec!["Buy milk".to_string()]);
        let notices = drain(&mut notice_rx);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Success);
        assert_eq!(notices[0].text, "Task added successfully!");

        manager.refresh().await;
        let tasks = manager.tasks().await;
        assert_eq!(tasks.len(), 1);
        assert!(!tasks[0].is_complete);
    }

    #[tokio::test]
    async fn add_is_a_noop_for_whitespace_title() {
        let (repository, manager, mut notice_rx) = setup();

        let accepted = manager.add("   \t").await;

        assert!(!accepted);
        assert!(repository.insert_titles().is_empty());
        assert!(drain(&mut notice_rx).is_empty());
    }

    #[tokio::test]
    async fn add_trims_the_title_before_inserting() {
        let (repository, manager, _notice_rx) = setup();

        manager.add("  Buy milk  ").await;

        assert_eq!(repository.insert_titles(), vec!["Buy milk".to_string()]);
    }

    #[tokio::test]
    async fn add_failure_emits_error_notice() {
        let (repository, manager, mut notice_rx) = setup();
        repository.fail_insert.store(true, Ordering::SeqCst);

        let accepted = manager.add("Buy milk").await;

        assert!(!accepted);
        let notices = drain(&mut notice_rx);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].text, "Error adding task");
    }

    #[tokio::test]
    async fn toggle_sends_the_negated_flag_only() {
        let (repository, manager, mut notice_rx) = setup();
        let open = test_task("Buy milk", false, 0);
        let done = test_task("Walk dog", true, 1);
        repository.seed(vec![open.clone(), done.clone()]);

        manager.toggle(&open).await;
        manager.toggle(&done).await;

        assert_eq!(
            repository.set_complete_calls(),
            vec![(open.id, true), (done.id, false)]
        );
        let notices = drain(&mut notice_rx);
        assert_eq!(notices.len(), 2);
        assert!(notices.iter().all(|n| n.text == "Task updated!"));
    }

    #[tokio::test]
    async fn toggle_does_not_mutate_the_cache() {
        let (repository, manager, _notice_rx) = setup();
        let open = test_task("Buy milk", false, 0);
        repository.seed(vec![open.clone()]);
        manager.refresh().await;

        manager.toggle(&open).await;

        // The authoritative state arrives only via the next refresh.
        assert!(!manager.tasks().await[0].is_complete);
        manager.refresh().await;
        assert!(manager.tasks().await[0].is_complete);
    }

    #[tokio::test]
    async fn refresh_replaces_the_cache_wholesale() {
        let (repository, manager, _notice_rx) = setup();
        let first = test_task("Buy milk", false, 0);
        let second = test_task("Walk dog", false, 1);
        repository.seed(vec![first.clone(), second.clone()]);

        manager.refresh().await;
        // Backend ordering is authoritative: creation time descending.
        assert_eq!(
            manager
                .tasks()
                .await
                .iter()
                .map(|t| t.title.clone())
                .collect::<Vec<_>>(),
            vec!["Walk dog".to_string(), "Buy milk".to_string()]
        );

        let third = test_task("Water plants", true, 2);
        repository.seed(vec![second.clone(), third.clone()]);
        manager.refresh().await;

        let titles: Vec<_> = manager
            .tasks()
            .await
            .iter()
            .map(|t| t.title.clone())
            .collect();
        assert_eq!(
            titles,
            vec!["Water plants".to_string(), "Walk dog".to_string()]
        );
    }

    #[tokio::test]
    async fn failed_refresh_keeps_the_cache_and_concludes_loading() {
        let (repository, manager, mut notice_rx) = setup();
        let task = test_task("Buy milk", false, 0);
        repository.seed(vec![task.clone()]);
        manager.refresh().await;
        drain(&mut notice_rx);

        repository.fail_list.store(true, Ordering::SeqCst);
        manager.refresh().await;

        assert_eq!(manager.load_state().await, LoadState::Ready);
        assert_eq!(manager.tasks().await, vec![task]);
        let notices = drain(&mut notice_rx);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].text, "Error fetching tasks");
    }

    #[tokio::test]
    async fn first_load_of_an_empty_list_emits_no_notice() {
        let (_repository, manager, mut notice_rx) = setup();
        assert_eq!(manager.load_state().await, LoadState::Uninitialized);

        manager.refresh().await;

        assert_eq!(manager.load_state().await, LoadState::Ready);
        assert!(manager.tasks().await.is_empty());
        assert!(drain(&mut notice_rx).is_empty());
    }

    #[tokio::test]
    async fn double_delete_surfaces_an_error_the_second_time() {
        let (repository, manager, mut notice_rx) = setup();
        let task = test_task("Buy milk", false, 0);
        repository.seed(vec![task.clone()]);

        manager.remove(task.id).await;
        manager.remove(task.id).await;

        let notices = drain(&mut notice_rx);
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].text, "Task deleted!");
        assert_eq!(notices[1].level, NoticeLevel::Error);
        assert_eq!(notices[1].text, "Error deleting task");

        // The cache always converges on the backend's current truth.
        manager.refresh().await;
        assert!(manager.tasks().await.is_empty());
    }

    #[tokio::test]
    async fn notices_after_view_teardown_are_dropped() {
        let (repository, manager, notice_rx) = setup();
        drop(notice_rx);

        // The operation itself still runs to completion.
        assert!(manager.add("Buy milk").await);
        assert_eq!(repository.insert_titles(), vec!["Buy milk".to_string()]);
    }
}
