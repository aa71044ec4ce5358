//! Terminal entry point for taskdeck.
//!
//! Wires the backend-facing services together, sets the terminal up and
//! hands control to the [`app::App`] event loop. Logs go to a rolling
//! file because the UI owns the terminal.

mod app;
mod toast;
mod ui;

use anyhow::Context;
use app::App;
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::sync::Arc;
use taskdeck_core::SessionStore;
use taskdeck_infrastructure::{AuthClient, BackendConfig, HostedSessionStore, RestTaskRepository};
use tracing_subscriber::EnvFilter;

fn init_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    let log_dir = std::env::var("TASKDECK_LOG_DIR").unwrap_or_else(|_| ".".to_string());
    let file_appender = tracing_appender::rolling::daily(log_dir, "taskdeck.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_env("TASKDECK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = init_tracing();

    let config = BackendConfig::from_env().context("backend configuration")?;

    // ===== Backend wiring =====
    let session_store = Arc::new(HostedSessionStore::new(AuthClient::new(config.clone())));
    let repository = Arc::new(RestTaskRepository::new(
        config.clone(),
        session_store.subscribe(),
    ));

    // ===== Terminal setup =====
    enable_raw_mode().context("enable raw mode")?;
    let mut out = std::io::stdout();
    execute!(out, EnterAlternateScreen).context("enter alternate screen")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(out))?;

    let app = App::new(config, session_store, repository);
    let result = app.run(&mut terminal).await;

    // ===== Terminal teardown =====
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();

    result
}
