use async_trait::async_trait;
use teloxide::types::{ChatId, InlineKeyboardMarkup, MessageId};

use super::{DownloadProgress, MediaFile, PlatformError, TransferKey};

/// The chat-platform calls a download needs. Texts are HTML.
#[async_trait]
pub trait ChatTransport: Send + Sync + 'static {
    async fn send_status(
        &self,
        chat_id: ChatId,
        text: String,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<MessageId, PlatformError>;

    async fn edit_status(&self, chat_id: ChatId, message_id: MessageId, text: String) -> Result<(), PlatformError>;

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), PlatformError>;

    /// Starts the transfer on first call for `key`; later calls report how far it got.
    async fn poll_download(&self, key: &TransferKey, file: &MediaFile) -> Result<DownloadProgress, PlatformError>;

    /// Called once the poller stops, whatever the outcome. Drops any state
    /// still held for `key`.
    async fn release_download(&self, key: &TransferKey, file: &MediaFile);
}
