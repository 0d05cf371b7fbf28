//! WebSocket support for real-time status updates.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use audex_core::{SessionState, StatusReporter};

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// WebSocket message sent to clients for real-time updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Engine log or pipeline status text.
    Status { message: String },
    /// Engine session changed state.
    EngineState {
        /// "unloaded", "loading", "ready" or "failed"
        state: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// A file was accepted as the current selection.
    FileSelected { name: String, size_bytes: u64 },
    /// An extraction finished and the MP3 was delivered.
    ExtractionComplete {
        request_id: String,
        size_bytes: u64,
        duration_ms: u64,
    },
    /// An extraction failed.
    ExtractionFailed { error: String },
}

impl WsMessage {
    fn type_label(&self) -> &'static str {
        match self {
            WsMessage::Status { .. } => "status",
            WsMessage::EngineState { .. } => "engine_state",
            WsMessage::FileSelected { .. } => "file_selected",
            WsMessage::ExtractionComplete { .. } => "extraction_complete",
            WsMessage::ExtractionFailed { .. } => "extraction_failed",
        }
    }
}

/// Broadcaster for WebSocket messages using tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct WsBroadcaster {
    sender: broadcast::Sender<WsMessage>,
}

impl WsBroadcaster {
    /// Create a new broadcaster with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Broadcast a message to all connected clients.
    pub fn broadcast(&self, msg: WsMessage) {
        // Ignore send errors - they just mean no one is listening
        let _ = self.sender.send(msg);
    }

    /// Subscribe to receive messages.
    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.sender.subscribe()
    }

    pub fn engine_state(&self, state: &SessionState) {
        let reason = match state {
            SessionState::Failed { reason } => Some(reason.clone()),
            _ => None,
        };
        self.broadcast(WsMessage::EngineState {
            state: state.as_str().to_string(),
            reason,
        });
    }

    pub fn file_selected(&self, name: &str, size_bytes: u64) {
        self.broadcast(WsMessage::FileSelected {
            name: name.to_string(),
            size_bytes,
        });
    }

    pub fn extraction_complete(&self, request_id: &str, size_bytes: u64, duration_ms: u64) {
        self.broadcast(WsMessage::ExtractionComplete {
            request_id: request_id.to_string(),
            size_bytes,
            duration_ms,
        });
    }

    pub fn extraction_failed(&self, error: &str) {
        self.broadcast(WsMessage::ExtractionFailed {
            error: error.to_string(),
        });
    }
}

impl Default for WsBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

impl StatusReporter for WsBroadcaster {
    fn report(&self, message: &str) {
        self.broadcast(WsMessage::Status {
            message: message.to_string(),
        });
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before the snapshot so no transition falls in between
    let mut rx = state.ws_broadcaster().subscribe();
    let current = state.workflow().engine_state().await;

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();
    info!("WebSocket client connected");

    let send_task = tokio::spawn(async move {
        let snapshot = WsMessage::EngineState {
            state: current.as_str().to_string(),
            reason: match current {
                SessionState::Failed { reason } => Some(reason),
                _ => None,
            },
        };
        if !send_message(&mut sender, &snapshot).await {
            return;
        }

        loop {
            match rx.recv().await {
                Ok(msg) => {
                    if !send_message(&mut sender, &msg).await {
                        debug!("WebSocket send failed, client disconnected");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("WebSocket client lagged, skipped {} messages", n);
                    WS_LAG_EVENTS.inc();
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Broadcast channel closed");
                    break;
                }
            }
        }
    });

    // Handle incoming messages from client (ping/pong, close)
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(Message::Ping(data)) => {
                // Pong is handled automatically by axum
                debug!("Received ping: {:?}", data);
            }
            Ok(Message::Text(text)) => {
                debug!("Received text message: {}", text);
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}

/// Serializes and sends one message. Returns false once the client is gone.
async fn send_message<S>(sender: &mut S, msg: &WsMessage) -> bool
where
    S: futures::Sink<Message> + Unpin,
{
    WS_MESSAGES_SENT.with_label_values(&[msg.type_label()]).inc();
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            error!("Failed to serialize WsMessage: {}", e);
            true
        }
    }
}
