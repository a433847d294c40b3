//! Webhook transport - POSTs replies to the chat bridge

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::paginate;
use crate::application::ports::outbound::{MessageTransportPort, TransportError};
use crate::domain::value_objects::ChannelId;

#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    channel: &'a str,
    content: &'a str,
}

/// Delivers each message as `{"channel", "content"}` JSON to a fixed URL.
pub struct WebhookTransport {
    client: Client,
    url: String,
    size_limit: usize,
}

impl WebhookTransport {
    pub fn new(url: &str, size_limit: usize) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
            size_limit,
        }
    }

    async fn post(&self, channel: &ChannelId, content: &str) -> Result<(), TransportError> {
        let response = self
            .client
            .post(&self.url)
            .json(&OutboundMessage {
                channel: channel.as_str(),
                content,
            })
            .send()
            .await
            .map_err(|e| TransportError::Delivery(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Delivery(format!("{}: {}", status, body)));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageTransportPort for WebhookTransport {
    async fn send_text(&self, channel: &ChannelId, text: &str) -> Result<(), TransportError> {
        let lines: Vec<&str> = text.lines().collect();
        for chunk in paginate(&lines, self.size_limit) {
            self.post(channel, &chunk).await?;
        }
        Ok(())
    }

    async fn send_lines(
        &self,
        channel: &ChannelId,
        lines: &[String],
        paginate_lines: bool,
    ) -> Result<(), TransportError> {
        if !paginate_lines {
            return self.post(channel, &lines.join("\n")).await;
        }
        for chunk in paginate(lines, self.size_limit) {
            self.post(channel, &chunk).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{http::StatusCode, routing::post, Json, Router};
    use tokio::sync::Mutex;

    use super::*;

    type Received = Arc<Mutex<Vec<serde_json::Value>>>;

    /// Local chat bridge answering every POST with `status`
    async fn bridge(status: StatusCode) -> (String, Received) {
        let received: Received = Arc::default();
        let sink = received.clone();
        let app = Router::new().route(
            "/hook",
            post(move |Json(body): Json<serde_json::Value>| {
                let sink = sink.clone();
                async move {
                    sink.lock().await.push(body);
                    status
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (format!("http://{}/hook", addr), received)
    }

    #[tokio::test]
    async fn test_paginated_lines_post_one_message_per_chunk() {
        let (url, received) = bridge(StatusCode::OK).await;
        let transport = WebhookTransport::new(&url, 10);
        let lines = vec!["aaaa".to_string(), "bbbb".to_string(), "cccc".to_string()];

        transport
            .send_lines(&ChannelId::from("ch"), &lines, true)
            .await
            .unwrap();

        let received = received.lock().await;
        assert_eq!(
            *received,
            vec![
                serde_json::json!({ "channel": "ch", "content": "aaaa\nbbbb" }),
                serde_json::json!({ "channel": "ch", "content": "cccc" }),
            ]
        );
    }

    #[tokio::test]
    async fn test_short_text_is_one_post() {
        let (url, received) = bridge(StatusCode::NO_CONTENT).await;
        let transport = WebhookTransport::new(&url, 2000);

        transport
            .send_text(&ChannelId::from("ch"), "> Aria looks around.\n> Aria sees nothing of note.")
            .await
            .unwrap();

        let received = received.lock().await;
        assert_eq!(received.len(), 1);
        assert_eq!(
            received[0]["content"],
            "> Aria looks around.\n> Aria sees nothing of note."
        );
    }

    #[tokio::test]
    async fn test_rejected_post_is_a_delivery_error() {
        let (url, received) = bridge(StatusCode::INTERNAL_SERVER_ERROR).await;
        let transport = WebhookTransport::new(&url, 2000);

        let result = transport.send_text(&ChannelId::from("ch"), "hello").await;

        assert!(matches!(
            result,
            Err(TransportError::Delivery(ref message)) if message.contains("500")
        ));
        assert_eq!(received.lock().await.len(), 1);
    }
}
