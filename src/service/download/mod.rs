use std::{path::PathBuf, sync::Arc, time::Duration};

use chrono::Utc;
use teloxide::types::{ChatId, MessageId};
use tokio::time::{sleep, Instant};

use crate::{
    config::DownloadConfig,
    handler::get_stop_download_keyboard,
    platform::{ChatTransport, MediaFile, MediaMessage, PlatformError, TransferKey},
};

mod error;
mod model;
pub mod progress;
mod validator;

pub use error::DownloadError;
pub use model::*;
pub use validator::MediaValidator;

/// Delay before the finished status message is removed.
const STATUS_CLEANUP_DELAY: Duration = Duration::from_secs(1);

#[derive(Clone)]
pub struct DownloadService {
    transport: Arc<dyn ChatTransport>,
    validator: MediaValidator,
    poll_interval: Duration,
    max_progress_edits: u32,
    max_poll_attempts: Option<u32>,
}

impl DownloadService {
    pub fn new(config: &DownloadConfig, transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            transport,
            validator: MediaValidator::new(config),
            poll_interval: config.poll_interval,
            max_progress_edits: config.max_progress_edits,
            max_poll_attempts: config.max_poll_attempts,
        }
    }

    pub fn validator(&self) -> &MediaValidator {
        &self.validator
    }

    pub async fn download(&self, message: Option<&MediaMessage>) -> Result<DownloadedMedia, DownloadError> {
        let message = match message {
            Some(message) if self.validator.is_valid(Some(message)) => message,
            _ => return Err(DownloadError::InvalidMedia),
        };
        let file = message.file.as_ref().ok_or(DownloadError::InvalidMedia)?;

        let (total_size, file_name) = self.validator.extract_file_info(message);
        let chat_id = message.chat_id;

        let status_message = self
            .transport
            .send_status(
                chat_id,
                progress::started_text(&file_name, total_size),
                get_stop_download_keyboard(&file.unique_id),
            )
            .await
            .map_err(|e| {
                error!("Error sending download message: {}", e);
                DownloadError::ErrorSendingMessage(e.to_string())
            })?;

        info!("Downloading {} ({} bytes) in chat {}", file_name, total_size, chat_id);

        let started_at = Instant::now();
        let mut session = DownloadSession::new(total_size, file_name, status_message, self.max_progress_edits);
        debug!("Progress edits every {} bytes", session.update_threshold());

        let key = TransferKey::new(chat_id, status_message, &file.unique_id);
        let polled = self.poll_until_complete(&key, file, &mut session).await;
        self.transport.release_download(&key, file).await;

        match polled {
            Ok(path) => {
                let elapsed = started_at.elapsed();
                let text = progress::completed_text(&session.file_name, total_size, elapsed);
                if let Err(e) = self.transport.edit_status(chat_id, status_message, text).await {
                    warn!("Failed to publish download summary: {}", e);
                }

                self.spawn_delete(chat_id, status_message, STATUS_CLEANUP_DELAY);

                info!(
                    "Downloaded {} to {} after {} progress edits",
                    session.file_name,
                    path.display(),
                    session.edits_issued()
                );

                Ok(DownloadedMedia {
                    path,
                    file_name: session.file_name,
                    size: total_size,
                    completed_at: Utc::now(),
                    elapsed,
                })
            }
            Err(e) => {
                error!("Download of {} failed: {}", session.file_name, e);

                let text = progress::failed_text(&session.file_name, &e.to_string());
                if let Err(edit_error) = self.transport.edit_status(chat_id, status_message, text).await {
                    warn!("Failed to publish download failure: {}", edit_error);
                }

                self.spawn_delete(chat_id, message.message_id, Duration::ZERO);

                Err(DownloadError::DownloadFailed(e.to_string()))
            }
        }
    }

    async fn poll_until_complete(
        &self,
        key: &TransferKey,
        file: &MediaFile,
        session: &mut DownloadSession,
    ) -> Result<PathBuf, PlatformError> {
        let mut attempts: u32 = 0;

        loop {
            if let Some(limit) = self.max_poll_attempts {
                if attempts >= limit {
                    return Err(PlatformError::Timeout(limit));
                }
            }
            attempts += 1;

            let progress = self.transport.poll_download(key, file).await?;
            if progress.completed {
                return progress
                    .local_path
                    .ok_or_else(|| PlatformError::Download("transfer completed without a local file".to_string()));
            }

            if let Some(snapshot) = session.due_snapshot(progress.downloaded) {
                let text = progress::progress_text(&session.file_name, session.total_size, &snapshot);
                match self.transport.edit_status(key.chat_id, session.status_message, text).await {
                    Ok(()) => session.record_edit(snapshot.downloaded),
                    Err(e) => debug!("Progress update failed: {}", e),
                }
            }

            sleep(self.poll_interval).await;
        }
    }

    fn spawn_delete(&self, chat_id: ChatId, message_id: MessageId, delay: Duration) {
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            if !delay.is_zero() {
                sleep(delay).await;
            }
            if let Err(e) = transport.delete_message(chat_id, message_id).await {
                debug!("Failed to delete message {} in chat {}: {}", message_id.0, chat_id, e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, sync::Mutex};

    use async_trait::async_trait;
    use teloxide::types::{InlineKeyboardButtonKind, InlineKeyboardMarkup};

    use super::*;
    use crate::{
        config::MIB,
        platform::{ContentKind, DownloadProgress},
    };

    const STATUS_ID: MessageId = MessageId(100);
    const SOURCE_ID: MessageId = MessageId(7);

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Send { text: String, callback: Option<String> },
        Edit(String),
        Delete(MessageId),
        Poll,
        Release(TransferKey),
    }

    #[derive(Default)]
    struct ScriptedTransport {
        polls: Mutex<VecDeque<DownloadProgress>>,
        calls: Mutex<Vec<Call>>,
        fail_send: bool,
        fail_edits: bool,
    }

    impl ScriptedTransport {
        fn with_polls(polls: impl IntoIterator<Item = DownloadProgress>) -> Self {
            Self {
                polls: Mutex::new(polls.into_iter().collect()),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn edits(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    Call::Edit(text) => Some(text),
                    _ => None,
                })
                .collect()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn send_status(
            &self,
            _chat_id: ChatId,
            text: String,
            keyboard: InlineKeyboardMarkup,
        ) -> Result<MessageId, PlatformError> {
            let callback = keyboard
                .inline_keyboard
                .iter()
                .flatten()
                .find_map(|button| match &button.kind {
                    InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                    _ => None,
                });
            self.record(Call::Send { text, callback });

            if self.fail_send {
                return Err(PlatformError::Download("chat not found".to_string()));
            }
            Ok(STATUS_ID)
        }

        async fn edit_status(&self, _chat_id: ChatId, _message_id: MessageId, text: String) -> Result<(), PlatformError> {
            self.record(Call::Edit(text));
            if self.fail_edits {
                return Err(PlatformError::Download("message is not modified".to_string()));
            }
            Ok(())
        }

        async fn delete_message(&self, _chat_id: ChatId, message_id: MessageId) -> Result<(), PlatformError> {
            self.record(Call::Delete(message_id));
            Ok(())
        }

        async fn poll_download(&self, _key: &TransferKey, _file: &MediaFile) -> Result<DownloadProgress, PlatformError> {
            self.record(Call::Poll);
            self.polls
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| PlatformError::Download("connection reset".to_string()))
        }

        async fn release_download(&self, key: &TransferKey, _file: &MediaFile) {
            self.record(Call::Release(key.clone()));
        }
    }

    fn releases(transport: &ScriptedTransport) -> Vec<TransferKey> {
        transport
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Release(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    fn video(size: u64) -> MediaMessage {
        MediaMessage {
            chat_id: ChatId(-100),
            message_id: SOURCE_ID,
            kind: ContentKind::Video,
            file: Some(MediaFile {
                file_id: "file-id".to_string(),
                unique_id: "AgADBQ".to_string(),
                size,
                file_name: Some("clip.mp4".to_string()),
                mime_type: Some("video/mp4".to_string()),
            }),
        }
    }

    fn service(transport: &Arc<ScriptedTransport>, config: DownloadConfig) -> DownloadService {
        DownloadService::new(&config, Arc::clone(transport) as Arc<dyn ChatTransport>)
    }

    fn done() -> DownloadProgress {
        DownloadProgress::completed(0, PathBuf::from("downloads/AgADBQ_clip.mp4"))
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_media_makes_no_calls() {
        let transport = Arc::new(ScriptedTransport::default());
        let service = service(&transport, DownloadConfig::default());

        let result = service.download(None).await;
        assert!(matches!(result, Err(DownloadError::InvalidMedia)));

        let text = MediaMessage {
            kind: ContentKind::Text,
            file: None,
            ..video(MIB)
        };
        let result = service.download(Some(&text)).await;
        assert_eq!(result.unwrap_err().label(), "InvalidMedia");

        let oversized = video(401 * MIB);
        assert!(matches!(
            service.download(Some(&oversized)).await,
            Err(DownloadError::InvalidMedia)
        ));

        assert!(transport.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_failure_aborts() {
        let transport = Arc::new(ScriptedTransport {
            fail_send: true,
            ..ScriptedTransport::default()
        });
        let service = service(&transport, DownloadConfig::default());

        let result = service.download(Some(&video(MIB))).await;
        let err = result.unwrap_err();
        assert_eq!(err.label(), "ErrorSendingMessage");

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert!(!calls.contains(&Call::Poll));
    }

    #[tokio::test(start_paused = true)]
    async fn test_happy_path_edits_and_cleans_up() {
        let transport = Arc::new(ScriptedTransport::with_polls([
            DownloadProgress::running(5 * MIB),
            DownloadProgress::running(25 * MIB),
            DownloadProgress::running(30 * MIB),
            DownloadProgress::running(50 * MIB),
            DownloadProgress::running(99 * MIB + MIB / 2),
            done(),
        ]));
        let service = service(&transport, DownloadConfig::default());

        let started = Instant::now();
        let media = service.download(Some(&video(100 * MIB))).await.unwrap();

        assert_eq!(media.label(), "clip.mp4");
        assert_eq!(media.size, 100 * MIB);
        assert_eq!(media.path, PathBuf::from("downloads/AgADBQ_clip.mp4"));
        // five sleeps of two seconds between the six polls
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(10) && elapsed < Duration::from_secs(11));

        let calls = transport.calls();
        assert_eq!(
            calls[0],
            Call::Send {
                text: "📥 Downloading: clip.mp4\nSize: 100.0MB\nProgress: 0%".to_string(),
                callback: Some("cancel_AgADBQ".to_string()),
            }
        );

        let edits = transport.edits();
        assert_eq!(edits.len(), 4);
        assert!(edits[0].contains("Progress: 25.0% [▰▰▱▱▱▱▱▱▱▱]"));
        assert!(edits[1].contains("Progress: 50.0% [▰▰▰▰▰▱▱▱▱▱]"));
        assert!(edits[2].contains("Progress: 99.5%"));
        assert!(edits[3].contains("Downloaded Successfully"));
        assert!(edits[3].contains("10s"));

        assert!(!calls.contains(&Call::Delete(STATUS_ID)));
        assert_eq!(releases(&transport), [TransferKey::new(ChatId(-100), STATUS_ID, "AgADBQ")]);
        sleep(Duration::from_secs(2)).await;
        assert_eq!(transport.calls().last(), Some(&Call::Delete(STATUS_ID)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_edits_are_capped() {
        let near_done = 5 * MIB * 998 / 1000;
        let transport = Arc::new(ScriptedTransport::with_polls(
            std::iter::repeat(DownloadProgress::running(near_done))
                .take(20)
                .chain([done()]),
        ));
        let service = service(&transport, DownloadConfig::default());

        service.download(Some(&video(5 * MIB))).await.unwrap();

        let edits = transport.edits();
        assert_eq!(edits.len(), 7);
        assert!(edits[..6].iter().all(|text| text.contains("Progress: 99.8%")));
        assert!(edits[6].contains("Downloaded Successfully"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_edit_budget() {
        let transport = Arc::new(ScriptedTransport::with_polls(
            std::iter::repeat(DownloadProgress::running(MIB)).take(5).chain([done()]),
        ));
        let config = DownloadConfig {
            max_progress_edits: 2,
            ..DownloadConfig::default()
        };

        service(&transport, config).download(Some(&video(MIB))).await.unwrap();

        assert_eq!(transport.edits().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_edits_do_not_count() {
        let transport = Arc::new(ScriptedTransport {
            fail_edits: true,
            ..ScriptedTransport::with_polls(
                std::iter::repeat(DownloadProgress::running(MIB)).take(10).chain([done()]),
            )
        });
        let service = service(&transport, DownloadConfig::default());

        let media = service.download(Some(&video(MIB))).await;
        assert!(media.is_ok());

        // every poll retried the edit, plus the summary
        assert_eq!(transport.edits().len(), 11);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_error_reports_and_removes_source() {
        let transport = Arc::new(ScriptedTransport::with_polls([DownloadProgress::running(MIB)]));
        let service = service(&transport, DownloadConfig::default());

        let err = service.download(Some(&video(100 * MIB))).await.unwrap_err();
        assert_eq!(err.label(), "DownloadFailed");
        assert!(err.to_string().contains("connection reset"));

        let edits = transport.edits();
        let last = edits.last().unwrap();
        assert!(last.starts_with("❌ Download failed: clip.mp4"));
        assert!(last.contains("connection reset"));

        assert_eq!(releases(&transport).len(), 1);

        sleep(Duration::from_millis(10)).await;
        assert!(transport.calls().contains(&Call::Delete(SOURCE_ID)));
        assert!(!transport.calls().contains(&Call::Delete(STATUS_ID)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_attempt_limit() {
        let transport = Arc::new(ScriptedTransport::with_polls(
            std::iter::repeat(DownloadProgress::running(MIB)).take(10),
        ));
        let config = DownloadConfig {
            max_poll_attempts: Some(3),
            ..DownloadConfig::default()
        };

        let err = service(&transport, config)
            .download(Some(&video(100 * MIB)))
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::DownloadFailed(_)));
        assert_eq!(transport.calls().iter().filter(|call| **call == Call::Poll).count(), 3);
        assert_eq!(
            releases(&transport),
            [TransferKey::new(ChatId(-100), STATUS_ID, "AgADBQ")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_without_path_is_a_failure() {
        let transport = Arc::new(ScriptedTransport::with_polls([DownloadProgress {
            downloaded: MIB,
            completed: true,
            local_path: None,
        }]));

        let err = service(&transport, DownloadConfig::default())
            .download(Some(&video(MIB)))
            .await
            .unwrap_err();

        assert_eq!(err.label(), "DownloadFailed");
    }
}
