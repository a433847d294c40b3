//! Channel transport - pushes replies to a connected WebSocket client

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::paginate;
use crate::application::ports::outbound::{MessageTransportPort, TransportError};
use crate::domain::value_objects::ChannelId;
use crate::infrastructure::websocket::ServerMessage;

pub struct ChannelTransport {
    sender: mpsc::UnboundedSender<ServerMessage>,
    size_limit: usize,
}

impl ChannelTransport {
    pub fn new(sender: mpsc::UnboundedSender<ServerMessage>, size_limit: usize) -> Self {
        Self { sender, size_limit }
    }

    fn push(&self, channel: &ChannelId, message: ServerMessage) -> Result<(), TransportError> {
        self.sender
            .send(message)
            .map_err(|_| TransportError::Closed(channel.clone()))
    }
}

#[async_trait]
impl MessageTransportPort for ChannelTransport {
    async fn send_text(&self, channel: &ChannelId, text: &str) -> Result<(), TransportError> {
        self.push(
            channel,
            ServerMessage::Text {
                channel_id: channel.clone(),
                text: text.to_string(),
            },
        )
    }

    async fn send_lines(
        &self,
        channel: &ChannelId,
        lines: &[String],
        paginate_lines: bool,
    ) -> Result<(), TransportError> {
        let pages = if paginate_lines {
            paginate(lines, self.size_limit)
        } else {
            vec![lines.join("\n")]
        };
        for page in pages {
            self.push(
                channel,
                ServerMessage::Lines {
                    channel_id: channel.clone(),
                    lines: page.lines().map(str::to_string).collect(),
                },
            )?;
        }
        Ok(())
    }
}
