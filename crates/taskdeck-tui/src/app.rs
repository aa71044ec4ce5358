//! Application shell and event loop.
//!
//! The shell owns the session subscription and switches between the
//! sign-in screen and the task screen on every session change. All
//! repository calls are spawned so the render loop never blocks; their
//! outcomes come back either through the notice channel (toasts) or the
//! internal app-event channel.

use crate::toast::{Toast, ToastStack, TOAST_TTL};
use crate::ui;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::Terminal;
use std::sync::Arc;
use std::time::Duration;
use taskdeck_core::{
    ChangeEvent, ChangeFeed, ChangeKind, Credentials, LoadState, Notice, Session, SessionStore,
    Task, TaskListManager, TaskRepository, TaskdeckError,
};
use taskdeck_infrastructure::{BackendConfig, RealtimeFeed};
use tokio::sync::{broadcast, mpsc};

const TICK: Duration = Duration::from_millis(200);

/// Results of spawned operations that need to touch UI state.
enum AppEvent {
    SignedIn(Result<Session, TaskdeckError>),
    AddFinished { accepted: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInField {
    Email,
    Password,
}

pub struct SignInForm {
    pub email: String,
    pub password: String,
    pub focus: SignInField,
    pub error: Option<String>,
    pub in_flight: bool,
}

impl Default for SignInForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            focus: SignInField::Email,
            error: None,
            in_flight: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFocus {
    Input,
    List,
}

/// State of the mounted task list view.
///
/// Dropping this (on sign-out or quit) drops the feed and its receiver,
/// so no change notification is processed past teardown. In-flight
/// repository calls still run to completion; their results land in a
/// cache nobody reads anymore.
pub struct TaskScreen {
    manager: Arc<TaskListManager>,
    feed: Option<RealtimeFeed>,
    changes: Option<broadcast::Receiver<ChangeEvent>>,
    pub input: String,
    pub focus: TaskFocus,
    pub selected: usize,
    pub email: Option<String>,
}

pub enum Screen {
    SignIn(SignInForm),
    Tasks(TaskScreen),
}

// Render-ready snapshots handed to `ui::render`.

pub struct SignInView {
    pub email: String,
    pub password_masked: String,
    pub focus: SignInField,
    pub error: Option<String>,
    pub in_flight: bool,
}

pub struct TasksView {
    pub tasks: Vec<Task>,
    pub loading: bool,
    pub input: String,
    pub focus: TaskFocus,
    pub selected: usize,
    pub email: Option<String>,
    pub live: bool,
}

pub enum ScreenView {
    SignIn(SignInView),
    Tasks(TasksView),
}

pub struct ViewSnapshot {
    pub screen: ScreenView,
    pub toasts: Vec<Toast>,
}

pub struct App {
    config: BackendConfig,
    session_store: Arc<dyn SessionStore>,
    repository: Arc<dyn TaskRepository>,
    screen: Screen,
    toasts: ToastStack,
    notice_tx: mpsc::UnboundedSender<Notice>,
    notice_rx: mpsc::UnboundedReceiver<Notice>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    should_quit: bool,
}

impl App {
    pub fn new(
        config: BackendConfig,
        session_store: Arc<dyn SessionStore>,
        repository: Arc<dyn TaskRepository>,
    ) -> Self {
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            config,
            session_store,
            repository,
            screen: Screen::SignIn(SignInForm::default()),
            toasts: ToastStack::new(TOAST_TTL),
            notice_tx,
            notice_rx,
            events_tx,
            events_rx,
            should_quit: false,
        }
    }

    /// Runs the UI until the user quits or the terminal goes away.
    pub async fn run<B: Backend>(mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let mut keys = EventStream::new();
        let mut session_rx = self.session_store.subscribe();
        let mut tick = tokio::time::interval(TICK);

        while !self.should_quit {
            let view = self.snapshot().await;
            terminal.draw(|frame| ui::render(frame, &view))?;

            tokio::select! {
                maybe_event = keys.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            self.handle_key(key).await;
                        }
                        Some(Ok(_)) => {} // resize etc. are covered by the redraw
                        Some(Err(err)) => return Err(err.into()),
                        None => break,
                    }
                }
                changed = session_rx.changed() => {
                    match changed {
                        Ok(()) => self.sync_screen().await,
                        Err(_) => break,
                    }
                }
                Some(notice) = self.notice_rx.recv() => {
                    self.toasts.push(notice);
                }
                Some(event) = self.events_rx.recv() => {
                    self.handle_app_event(event);
                }
                change = next_change(&mut self.screen) => {
                    self.handle_change(change);
                }
                _ = tick.tick() => {
                    self.toasts.prune();
                }
            }
        }
        Ok(())
    }

    /// Aligns the mounted screen with the current session value.
    ///
    /// Idempotent: a duplicate wakeup for an unchanged state is a no-op,
    /// so initial-fetch/subscription ordering does not matter.
    async fn sync_screen(&mut self) {
        match self.session_store.current_session().await {
            Some(session) => {
                if matches!(self.screen, Screen::SignIn(_)) {
                    self.mount_tasks(session).await;
                }
            }
            None => {
                if matches!(self.screen, Screen::Tasks(_)) {
                    self.screen = Screen::SignIn(SignInForm::default());
                }
            }
        }
    }

    async fn mount_tasks(&mut self, session: Session) {
        let manager = Arc::new(TaskListManager::new(
            self.repository.clone(),
            self.notice_tx.clone(),
        ));

        let (feed, changes) = match RealtimeFeed::connect(&self.config).await {
            Ok(feed) => {
                let changes = feed.subscribe();
                (Some(feed), Some(changes))
            }
            Err(err) => {
                // The list still works without live refresh.
                tracing::warn!("live refresh unavailable: {err}");
                (None, None)
            }
        };

        let initial = manager.clone();
        tokio::spawn(async move { initial.refresh().await });

        self.screen = Screen::Tasks(TaskScreen {
            manager,
            feed,
            changes,
            input: String::new(),
            focus: TaskFocus::Input,
            selected: 0,
            email: session.user.email,
        });
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            self.should_quit = true;
            return;
        }

        match &mut self.screen {
            Screen::SignIn(form) => match key.code {
                KeyCode::Tab | KeyCode::BackTab => {
                    form.focus = match form.focus {
                        SignInField::Email => SignInField::Password,
                        SignInField::Password => SignInField::Email,
                    };
                }
                KeyCode::Enter => {
                    if form.in_flight {
                        return;
                    }
                    if form.email.trim().is_empty() || form.password.is_empty() {
                        form.error = Some("Email and password are required".to_string());
                        return;
                    }
                    form.in_flight = true;
                    form.error = None;
                    let credentials = Credentials::new(form.email.trim(), form.password.clone());
                    let store = self.session_store.clone();
                    let events = self.events_tx.clone();
                    tokio::spawn(async move {
                        let result = store.sign_in(&credentials).await;
                        let _ = events.send(AppEvent::SignedIn(result));
                    });
                }
                KeyCode::Backspace => match form.focus {
                    SignInField::Email => {
                        form.email.pop();
                    }
                    SignInField::Password => {
                        form.password.pop();
                    }
                },
                KeyCode::Char(c) => match form.focus {
                    SignInField::Email => form.email.push(c),
                    SignInField::Password => form.password.push(c),
                },
                _ => {}
            },
            Screen::Tasks(tasks) => {
                if key.code == KeyCode::Char('l')
                    && key.modifiers.contains(KeyModifiers::CONTROL)
                {
                    let store = self.session_store.clone();
                    tokio::spawn(async move {
                        if let Err(err) = store.sign_out().await {
                            tracing::warn!("sign-out failed: {err}");
                        }
                    });
                    return;
                }

                match key.code {
                    KeyCode::Tab | KeyCode::BackTab => {
                        tasks.focus = match tasks.focus {
                            TaskFocus::Input => TaskFocus::List,
                            TaskFocus::List => TaskFocus::Input,
                        };
                    }
                    _ => match tasks.focus {
                        TaskFocus::Input => match key.code {
                            KeyCode::Enter => {
                                let title = tasks.input.trim().to_string();
                                if title.is_empty() {
                                    // Empty submission: no call, input untouched.
                                    return;
                                }
                                let manager = tasks.manager.clone();
                                let events = self.events_tx.clone();
                                tokio::spawn(async move {
                                    let accepted = manager.add(&title).await;
                                    let _ = events.send(AppEvent::AddFinished { accepted });
                                });
                            }
                            KeyCode::Backspace => {
                                tasks.input.pop();
                            }
                            KeyCode::Char(c) => tasks.input.push(c),
                            _ => {}
                        },
                        TaskFocus::List => match key.code {
                            KeyCode::Up => {
                                tasks.selected = tasks.selected.saturating_sub(1);
                            }
                            KeyCode::Down => {
                                let count = tasks.manager.tasks().await.len();
                                if count > 0 {
                                    tasks.selected = (tasks.selected + 1).min(count - 1);
                                }
                            }
                            KeyCode::Char(' ') | KeyCode::Enter => {
                                if let Some(task) = selected_task(tasks).await {
                                    let manager = tasks.manager.clone();
                                    tokio::spawn(async move { manager.toggle(&task).await });
                                }
                            }
                            KeyCode::Char('d') | KeyCode::Delete => {
                                if let Some(task) = selected_task(tasks).await {
                                    let manager = tasks.manager.clone();
                                    tokio::spawn(async move { manager.remove(task.id).await });
                                }
                            }
                            _ => {}
                        },
                    },
                }
            }
        }
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SignedIn(result) => {
                // The success path is driven by the session watch channel;
                // here only the form state needs updating.
                if let Screen::SignIn(form) = &mut self.screen {
                    form.in_flight = false;
                    if let Err(err) = result {
                        tracing::warn!("sign-in failed: {err}");
                        form.error = Some("Sign-in failed. Check your credentials.".to_string());
                        form.password.clear();
                    }
                }
            }
            AppEvent::AddFinished { accepted } => {
                if accepted && let Screen::Tasks(tasks) = &mut self.screen {
                    tasks.input.clear();
                }
            }
        }
    }

    fn handle_change(&mut self, change: Option<ChangeEvent>) {
        let Screen::Tasks(tasks) = &mut self.screen else {
            return;
        };
        match change {
            Some(event) => {
                tracing::debug!(kind = ?event.kind, "refreshing after change notification");
                let manager = tasks.manager.clone();
                tokio::spawn(async move { manager.refresh().await });
            }
            None => {
                tracing::info!("change feed ended; live refresh disabled");
                tasks.changes = None;
                tasks.feed = None;
            }
        }
    }

    async fn snapshot(&self) -> ViewSnapshot {
        let screen = match &self.screen {
            Screen::SignIn(form) => ScreenView::SignIn(SignInView {
                email: form.email.clone(),
                password_masked: "*".repeat(form.password.chars().count()),
                focus: form.focus,
                error: form.error.clone(),
                in_flight: form.in_flight,
            }),
            Screen::Tasks(tasks) => {
                let items = tasks.manager.tasks().await;
                let state = tasks.manager.load_state().await;
                let loading = items.is_empty() && !matches!(state, LoadState::Ready);
                ScreenView::Tasks(TasksView {
                    selected: tasks.selected.min(items.len().saturating_sub(1)),
                    tasks: items,
                    loading,
                    input: tasks.input.clone(),
                    focus: tasks.focus,
                    email: tasks.email.clone(),
                    live: tasks.feed.is_some() && tasks.changes.is_some(),
                })
            }
        };
        ViewSnapshot {
            screen,
            toasts: self.toasts.visible().to_vec(),
        }
    }
}

async fn selected_task(tasks: &TaskScreen) -> Option<Task> {
    let current = tasks.manager.tasks().await;
    if current.is_empty() {
        return None;
    }
    current.get(tasks.selected.min(current.len() - 1)).cloned()
}

/// Resolves to the next change event of the mounted task screen, or
/// never when no feed is attached. `None` means the feed closed.
async fn next_change(screen: &mut Screen) -> Option<ChangeEvent> {
    match screen {
        Screen::Tasks(tasks) => match tasks.changes.as_mut() {
            Some(changes) => match changes.recv().await {
                Ok(event) => Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // A lagged receiver still owes its owner a refresh.
                    tracing::debug!(skipped, "change feed lagged");
                    Some(ChangeEvent {
                        kind: ChangeKind::Update,
                    })
                }
                Err(broadcast::error::RecvError::Closed) => None,
            },
            None => std::future::pending().await,
        },
        Screen::SignIn(_) => std::future::pending().await,
    }
}
