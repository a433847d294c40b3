//! Transport port - Interface for delivering replies to the chat platform

use async_trait::async_trait;

use crate::domain::value_objects::ChannelId;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Delivery failed: {0}")]
    Delivery(String),
    #[error("Channel closed: {0}")]
    Closed(ChannelId),
}

/// Outbound messaging. Splitting long content into several deliveries is the
/// transport's job; callers only hand over ordered text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageTransportPort: Send + Sync {
    async fn send_text(&self, channel: &ChannelId, text: &str) -> Result<(), TransportError>;

    async fn send_lines(
        &self,
        channel: &ChannelId,
        lines: &[String],
        paginate: bool,
    ) -> Result<(), TransportError>;
}
