//! WebSocket gateway for chat bridges
//!
//! A bridge forwards chat messages as `ClientMessage::Command` frames. Replies are
//! pushed back on the same socket as `Text`/`Lines` frames, followed by the
//! `Outcome` of the command.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::application::dto::{CommandOutcome, InboundMessage};
use crate::domain::value_objects::{CampaignId, ChannelId, RoleId, UserId};
use crate::infrastructure::state::AppState;
use crate::infrastructure::transport::ChannelTransport;

/// Messages from the bridge to the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// A chat message posted in a campaign channel
    Command {
        campaign_id: CampaignId,
        channel_id: ChannelId,
        author_id: UserId,
        #[serde(default)]
        author_roles: Vec<RoleId>,
        #[serde(default)]
        author_is_bot: bool,
        content: String,
    },
    Ping,
}

/// Messages from the engine to the bridge
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    Text {
        channel_id: ChannelId,
        text: String,
    },
    Lines {
        channel_id: ChannelId,
        lines: Vec<String>,
    },
    Outcome {
        outcome: CommandOutcome,
    },
    Error {
        code: String,
        message: String,
    },
    Pong,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let client_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    tracing::info!("New WebSocket connection established: {}", client_id);

    // Forward queued frames to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => {
                    if let Some(response) = handle_message(msg, &state, tx.clone()).await {
                        if tx.send(response).is_err() {
                            break;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to parse message: {}", e);
                    let error = ServerMessage::Error {
                        code: "PARSE_ERROR".to_string(),
                        message: format!("Invalid message format: {}", e),
                    };
                    if tx.send(error).is_err() {
                        break;
                    }
                }
            },
            Ok(Message::Close(_)) => {
                tracing::info!("WebSocket connection closed by client: {}", client_id);
                break;
            }
            Err(e) => {
                tracing::error!("WebSocket error for client {}: {}", client_id, e);
                break;
            }
            _ => {}
        }
    }

    send_task.abort();
    tracing::info!("WebSocket connection terminated: {}", client_id);
}

async fn handle_message(
    msg: ClientMessage,
    state: &AppState,
    tx: mpsc::UnboundedSender<ServerMessage>,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::Ping => Some(ServerMessage::Pong),
        ClientMessage::Command {
            campaign_id,
            channel_id,
            author_id,
            author_roles,
            author_is_bot,
            content,
        } => {
            let inbound = InboundMessage {
                campaign_id,
                channel_id,
                author_id,
                author_roles,
                author_is_bot,
                content,
            };
            let transport = ChannelTransport::new(tx, state.config.message_size_limit);
            state
                .commands
                .execute(&inbound, &transport)
                .await
                .map(|outcome| ServerMessage::Outcome { outcome })
        }
    }
}
