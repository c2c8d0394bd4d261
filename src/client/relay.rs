use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use super::{MentionTarget, MessagingClient, SendError, SendResult};

#[derive(Debug, Serialize)]
struct TextRequest<'a> {
    receiver: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "no_mentions")]
    at_users: &'a [MentionTarget],
}

fn no_mentions(mentions: &&[MentionTarget]) -> bool {
    mentions.is_empty()
}

#[derive(Debug, Serialize)]
struct PathRequest<'a> {
    receiver: &'a str,
    path: &'a Path,
}

#[derive(Debug, Serialize)]
struct CardRequest<'a> {
    receiver: &'a str,
    wxid: &'a str,
}

#[derive(Debug, Serialize)]
struct XmlRequest<'a> {
    receiver: &'a str,
    xml: &'a str,
}

/// Forwards send primitives as JSON POSTs to a session bridge running next to
/// the messaging client, one route per primitive (`{base}/send_text`, ...).
pub struct RelayClient {
    client: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post<T: Serialize + ?Sized>(&self, primitive: &str, body: &T) -> SendResult {
        let url = format!("{}/{}", self.base_url, primitive);

        debug!("Forwarding {} to session bridge: {}", primitive, url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| SendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(SendError::Rejected(format!(
                "session bridge error ({}): {}",
                status, error_body
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl MessagingClient for RelayClient {
    fn name(&self) -> &str {
        "relay"
    }

    async fn send_text(&self, content: &str, receiver: &str) -> SendResult {
        self.post(
            "send_text",
            &TextRequest {
                receiver,
                content,
                at_users: &[],
            },
        )
        .await
    }

    async fn send_text_with_mentions(
        &self,
        content: &str,
        receiver: &str,
        mentions: &[MentionTarget],
    ) -> SendResult {
        self.post(
            "send_room_at_msg",
            &TextRequest {
                receiver,
                content,
                at_users: mentions,
            },
        )
        .await
    }

    async fn send_image(&self, path: &Path, receiver: &str) -> SendResult {
        self.post("send_image", &PathRequest { receiver, path }).await
    }

    async fn send_file(&self, path: &Path, receiver: &str) -> SendResult {
        self.post("send_file", &PathRequest { receiver, path }).await
    }

    async fn send_video(&self, path: &Path, receiver: &str) -> SendResult {
        self.post("send_video", &PathRequest { receiver, path }).await
    }

    async fn send_card(&self, card_id: &str, receiver: &str) -> SendResult {
        self.post(
            "send_card",
            &CardRequest {
                receiver,
                wxid: card_id,
            },
        )
        .await
    }

    async fn send_xml(&self, xml: &str, receiver: &str) -> SendResult {
        self.post("send_xml", &XmlRequest { receiver, xml }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_text_forwarded_as_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/send_text")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "receiver": "room1",
                "content": "hi"
            })))
            .with_status(200)
            .create_async()
            .await;

        let client = RelayClient::new(&format!("{}/", server.url()));
        client.send_text("hi", "room1").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_mentions_forwarded() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/send_room_at_msg")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "receiver": "room1@chatroom",
                "content": "standup",
                "at_users": [{"nickname": "", "wxid": "wxid_a"}]
            })))
            .with_status(200)
            .create_async()
            .await;

        let client = RelayClient::new(&server.url());
        client
            .send_text_with_mentions("standup", "room1@chatroom", &[MentionTarget::new("wxid_a")])
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/send_card")
            .with_status(502)
            .with_body("session offline")
            .create_async()
            .await;

        let client = RelayClient::new(&server.url());
        let err = client.send_card("wxid_card", "u1").await.unwrap_err();
        assert!(matches!(err, SendError::Rejected(_)));
        assert!(err.to_string().contains("session offline"));
    }

    #[tokio::test]
    async fn test_unreachable_bridge_is_transport_error() {
        let client = RelayClient::new("http://127.0.0.1:9");
        let err = client.send_xml("<msg/>", "u1").await.unwrap_err();
        assert!(matches!(err, SendError::Transport(_)));
    }
}
