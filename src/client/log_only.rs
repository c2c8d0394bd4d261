use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use super::{MentionTarget, MessagingClient, SendResult};

/// Dry-run client: accepts every send and only logs it. Used when no session
/// bridge is configured.
#[derive(Debug, Default)]
pub struct LogOnlyClient;

#[async_trait]
impl MessagingClient for LogOnlyClient {
    fn name(&self) -> &str {
        "log-only"
    }

    async fn send_text(&self, content: &str, receiver: &str) -> SendResult {
        info!("[dry-run] text to {} ({} chars)", receiver, content.chars().count());
        Ok(())
    }

    async fn send_text_with_mentions(
        &self,
        content: &str,
        receiver: &str,
        mentions: &[MentionTarget],
    ) -> SendResult {
        let ids: Vec<&str> = mentions.iter().map(|m| m.wxid.as_str()).collect();
        info!(
            "[dry-run] text to {} ({} chars) mentioning {:?}",
            receiver,
            content.chars().count(),
            ids
        );
        Ok(())
    }

    async fn send_image(&self, path: &Path, receiver: &str) -> SendResult {
        info!("[dry-run] image {} to {}", path.display(), receiver);
        Ok(())
    }

    async fn send_file(&self, path: &Path, receiver: &str) -> SendResult {
        info!("[dry-run] file {} to {}", path.display(), receiver);
        Ok(())
    }

    async fn send_video(&self, path: &Path, receiver: &str) -> SendResult {
        info!("[dry-run] video {} to {}", path.display(), receiver);
        Ok(())
    }

    async fn send_card(&self, card_id: &str, receiver: &str) -> SendResult {
        info!("[dry-run] card {} to {}", card_id, receiver);
        Ok(())
    }

    async fn send_xml(&self, xml: &str, receiver: &str) -> SendResult {
        info!("[dry-run] xml ({} bytes) to {}", xml.len(), receiver);
        Ok(())
    }
}
