//! Log transport - used when no webhook is configured

use async_trait::async_trait;

use crate::application::ports::outbound::{MessageTransportPort, TransportError};
use crate::domain::value_objects::ChannelId;

/// Writes every outbound message to the log instead of a chat platform.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTransport;

impl LogTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MessageTransportPort for LogTransport {
    async fn send_text(&self, channel: &ChannelId, text: &str) -> Result<(), TransportError> {
        tracing::info!(%channel, "{}", text);
        Ok(())
    }

    async fn send_lines(
        &self,
        channel: &ChannelId,
        lines: &[String],
        _paginate: bool,
    ) -> Result<(), TransportError> {
        for line in lines {
            tracing::info!(%channel, "{}", line);
        }
        Ok(())
    }
}
