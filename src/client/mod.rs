pub mod log_only;
pub mod relay;

use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;

pub use log_only::LogOnlyClient;
pub use relay::RelayClient;

/// Error raised by the messaging session when a send primitive fails.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// The session answered but refused the message.
    #[error("{0}")]
    Rejected(String),
    /// The session could not be reached.
    #[error("transport error: {0}")]
    Transport(String),
}

pub type SendResult = Result<(), SendError>;

/// A member mentioned in a group text. The nickname is left empty; the
/// session resolves it from the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentionTarget {
    pub nickname: String,
    pub wxid: String,
}

impl MentionTarget {
    pub fn new(wxid: &str) -> Self {
        Self {
            nickname: String::new(),
            wxid: wxid.to_string(),
        }
    }
}

/// The connected messaging session the gateway sends through.
///
/// Implementations own the protocol connection; the gateway only forwards
/// calls and reports the outcome.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    async fn send_text(&self, content: &str, receiver: &str) -> SendResult;

    async fn send_text_with_mentions(
        &self,
        content: &str,
        receiver: &str,
        mentions: &[MentionTarget],
    ) -> SendResult;

    async fn send_image(&self, path: &Path, receiver: &str) -> SendResult;

    async fn send_file(&self, path: &Path, receiver: &str) -> SendResult;

    async fn send_video(&self, path: &Path, receiver: &str) -> SendResult;

    /// Share the contact card of `card_id` with `receiver`.
    async fn send_card(&self, card_id: &str, receiver: &str) -> SendResult;

    /// Send a raw XML app-message (used for link cards).
    async fn send_xml(&self, xml: &str, receiver: &str) -> SendResult;
}
