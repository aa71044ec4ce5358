//! Realtime change feed.
//!
//! Subscribes to the backend's change-notification channel (a
//! Phoenix-style websocket) for the task table and fans the events out
//! to local subscribers over a broadcast channel. The payload carries no
//! row diff; every event means "a refresh is warranted".

use crate::config::BackendConfig;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use taskdeck_core::{ChangeEvent, ChangeFeed, ChangeKind, Result, TaskdeckError};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Channel topic watching every change on the task table.
const TASKS_TOPIC: &str = "realtime:public:tasks";
/// Control topic for protocol-level frames.
const CONTROL_TOPIC: &str = "phoenix";
const JOIN_EVENT: &str = "phx_join";
const HEARTBEAT_EVENT: &str = "heartbeat";
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

// A lagged receiver only loses redundant refresh hints; the channel
// contract is at-least-once.
const EVENT_BUFFER: usize = 16;

#[derive(Debug, Serialize)]
struct OutboundFrame<'a> {
    topic: &'a str,
    event: &'a str,
    payload: serde_json::Value,
    #[serde(rename = "ref")]
    reference: String,
}

#[derive(Debug, Deserialize)]
struct InboundFrame {
    topic: String,
    event: String,
}

/// Live change feed for the task table.
///
/// The socket loop runs in a background task for the lifetime of this
/// value; dropping the feed aborts it. Individual subscribers tear down
/// by dropping their receiver.
pub struct RealtimeFeed {
    events: broadcast::Sender<ChangeEvent>,
    socket_task: JoinHandle<()>,
}

impl RealtimeFeed {
    /// Connects to the backend's realtime endpoint and joins the task
    /// channel.
    ///
    /// # Errors
    ///
    /// Returns a `Network` error if the websocket handshake fails. Errors
    /// after the handshake terminate the feed silently (a log line, no
    /// user-facing surface): live refresh degrades, the rest of the
    /// application keeps working.
    pub async fn connect(config: &BackendConfig) -> Result<Self> {
        let (socket, _response) = connect_async(config.realtime_url())
            .await
            .map_err(|e| TaskdeckError::network(format!("realtime connect failed: {e}")))?;

        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let sender = events.clone();
        let socket_task = tokio::spawn(async move {
            match run_socket(socket, sender).await {
                Ok(()) => tracing::info!("realtime feed closed by the backend"),
                Err(err) => tracing::warn!("realtime feed terminated: {err}"),
            }
        });

        Ok(Self { events, socket_task })
    }
}

impl ChangeFeed for RealtimeFeed {
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }
}

impl Drop for RealtimeFeed {
    fn drop(&mut self) {
        self.socket_task.abort();
    }
}

async fn run_socket(socket: Socket, events: broadcast::Sender<ChangeEvent>) -> Result<()> {
    let (mut sink, mut stream) = socket.split();

    // Frame refs increment monotonically across join and heartbeats.
    let mut reference: u64 = 1;
    sink.send(Message::text(control_frame(TASKS_TOPIC, JOIN_EVENT, reference)?))
        .await
        .map_err(|e| TaskdeckError::network(format!("channel join failed: {e}")))?;

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    // The first tick resolves immediately; the join above already
    // counts as traffic, so consume it.
    heartbeat.tick().await;

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                reference += 1;
                sink.send(Message::text(control_frame(CONTROL_TOPIC, HEARTBEAT_EVENT, reference)?))
                    .await
                    .map_err(|e| TaskdeckError::network(format!("heartbeat failed: {e}")))?;
            }
            message = stream.next() => {
                match message {
                    None => return Ok(()),
                    Some(Err(err)) => {
                        return Err(TaskdeckError::network(format!("realtime read failed: {err}")));
                    }
                    Some(Ok(Message::Text(text))) => {
                        if let Some(event) = parse_change(text.as_str()) {
                            tracing::debug!(kind = ?event.kind, "task table changed");
                            // No receivers is fine: nothing is mounted.
                            let _ = events.send(event);
                        }
                    }
                    Some(Ok(Message::Close(_))) => return Ok(()),
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

fn control_frame(topic: &str, event: &str, reference: u64) -> Result<String> {
    Ok(serde_json::to_string(&OutboundFrame {
        topic,
        event,
        payload: serde_json::json!({}),
        reference: reference.to_string(),
    })?)
}

/// Extracts a change event from a raw frame, ignoring protocol replies
/// and frames for other topics.
fn parse_change(raw: &str) -> Option<ChangeEvent> {
    let frame: InboundFrame = serde_json::from_str(raw).ok()?;
    if frame.topic != TASKS_TOPIC {
        return None;
    }
    let kind = match frame.event.as_str() {
        "INSERT" => ChangeKind::Insert,
        "UPDATE" => ChangeKind::Update,
        "DELETE" => ChangeKind::Delete,
        _ => return None,
    };
    Some(ChangeEvent { kind })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_row_change_frames() {
        let raw = r#"{
            "topic": "realtime:public:tasks",
            "event": "INSERT",
            "payload": {"record": {"id": "abc"}, "schema": "public", "table": "tasks"},
            "ref": null
        }"#;
        assert_eq!(
            parse_change(raw),
            Some(ChangeEvent { kind: ChangeKind::Insert })
        );
    }

    #[test]
    fn ignores_protocol_replies_and_foreign_topics() {
        let reply = r#"{"topic":"realtime:public:tasks","event":"phx_reply","payload":{"status":"ok"},"ref":"1"}"#;
        assert_eq!(parse_change(reply), None);

        let foreign = r#"{"topic":"realtime:public:notes","event":"INSERT","payload":{},"ref":null}"#;
        assert_eq!(parse_change(foreign), None);

        assert_eq!(parse_change("not json"), None);
    }

    #[test]
    fn control_frames_carry_topic_event_and_ref() {
        let raw = control_frame(CONTROL_TOPIC, HEARTBEAT_EVENT, 7).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["topic"], "phoenix");
        assert_eq!(value["event"], "heartbeat");
        assert_eq!(value["ref"], "7");
        assert!(value["payload"].is_object());
    }
}
