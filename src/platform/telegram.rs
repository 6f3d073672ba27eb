use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use dashmap::DashMap;
use futures::StreamExt;
use teloxide::{
    adaptors::Throttle,
    net::Download,
    payloads::{EditMessageTextSetters, SendMessageSetters},
    prelude::Requester,
    types::{ChatId, InlineKeyboardMarkup, MessageId, ParseMode},
    Bot,
};
use tokio::{fs, io::AsyncWriteExt, task::AbortHandle};

use super::{
    traits::ChatTransport,
    transfer::{PollOutcome, TransferState, TransferTable},
    DownloadProgress, MediaFile, PlatformError, TransferKey,
};

/// Bot API transport. Each download streams into its own file from a
/// spawned task and publishes progress under its `TransferKey`.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Throttle<Bot>,
    download_dir: PathBuf,
    transfers: TransferTable,
    tasks: Arc<DashMap<TransferKey, AbortHandle>>,
}

impl TelegramTransport {
    pub fn new(bot: Throttle<Bot>, download_dir: PathBuf) -> Self {
        Self {
            bot,
            download_dir,
            transfers: TransferTable::default(),
            tasks: Arc::new(DashMap::new()),
        }
    }

    fn destination(&self, key: &TransferKey, file: &MediaFile) -> PathBuf {
        destination_in(&self.download_dir, key, file)
    }

    fn spawn_transfer(&self, key: &TransferKey, file: &MediaFile) {
        let bot = self.bot.clone();
        let transfers = self.transfers.clone();
        let destination = self.destination(key, file);
        let file_id = file.file_id.clone();
        let task_key = key.clone();

        let handle = tokio::spawn(async move {
            let key = task_key;
            let outcome = match fetch_to_disk(&bot, &file_id, &destination, &transfers, &key).await {
                Ok(size) => {
                    info!("Saved {} ({} bytes) to {}", key, size, destination.display());
                    TransferState::Completed {
                        path: destination,
                        size,
                    }
                }
                Err(e) => {
                    error!("Transfer {} failed: {}", key, e);
                    if let Err(io) = fs::remove_file(&destination).await {
                        debug!("No partial file to remove at {}: {}", destination.display(), io);
                    }
                    TransferState::Failed(e.to_string())
                }
            };

            if !transfers.finish(&key, outcome) {
                debug!("Transfer {} ended after it was released", key);
            }
        });

        self.tasks.insert(key.clone(), handle.abort_handle());
    }
}

fn destination_in(download_dir: &Path, key: &TransferKey, file: &MediaFile) -> PathBuf {
    let name = file.file_name.as_deref().map(sanitize_file_name).unwrap_or_default();
    if name.is_empty() {
        download_dir.join(key.to_string())
    } else {
        download_dir.join(format!("{}_{}", key, name))
    }
}

async fn fetch_to_disk(
    bot: &Throttle<Bot>,
    file_id: &str,
    destination: &Path,
    transfers: &TransferTable,
    key: &TransferKey,
) -> Result<u64, PlatformError> {
    let remote = bot.get_file(file_id.to_string()).await?;

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).await?;
    }
    let mut out = fs::File::create(destination).await?;

    let mut stream = bot.inner().download_file_stream(&remote.path);
    let mut downloaded = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| PlatformError::Download(e.to_string()))?;
        out.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        transfers.record_progress(key, downloaded);
    }

    out.flush().await?;

    Ok(downloaded)
}

fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_status(
        &self,
        chat_id: ChatId,
        text: String,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<MessageId, PlatformError> {
        let message = self
            .bot
            .send_message(chat_id, text)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await?;

        Ok(message.id)
    }

    async fn edit_status(&self, chat_id: ChatId, message_id: MessageId, text: String) -> Result<(), PlatformError> {
        self.bot
            .edit_message_text(chat_id, message_id, text)
            .parse_mode(ParseMode::Html)
            .await?;

        Ok(())
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), PlatformError> {
        self.bot.delete_message(chat_id, message_id).await?;
        Ok(())
    }

    async fn poll_download(&self, key: &TransferKey, file: &MediaFile) -> Result<DownloadProgress, PlatformError> {
        let outcome = self.transfers.poll(key).inspect_err(|_| {
            self.tasks.remove(key);
        })?;

        match outcome {
            PollOutcome::Started => {
                debug!("Starting transfer {}", key);
                self.spawn_transfer(key, file);
                Ok(DownloadProgress::running(0))
            }
            PollOutcome::Progress(progress) => {
                if progress.completed {
                    self.tasks.remove(key);
                }
                Ok(progress)
            }
        }
    }

    async fn release_download(&self, key: &TransferKey, file: &MediaFile) {
        if let Some((_, task)) = self.tasks.remove(key) {
            task.abort();
        }

        if self.transfers.release(key).is_some() {
            let destination = self.destination(key, file);
            debug!("Discarding unfinished transfer {}", key);
            if let Err(e) = fs::remove_file(&destination).await {
                debug!("No partial file to remove at {}: {}", destination.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use teloxide::{adaptors::throttle::Limits, requests::RequesterExt};

    use super::*;

    fn file(file_name: Option<&str>) -> MediaFile {
        MediaFile {
            file_id: "file-id".to_string(),
            unique_id: "AgADBQ".to_string(),
            size: 2048,
            file_name: file_name.map(str::to_string),
            mime_type: None,
        }
    }

    fn transport(download_dir: &Path) -> TelegramTransport {
        let bot = Bot::new("1234567890:TEST_TOKEN").throttle(Limits::default());
        TelegramTransport::new(bot, download_dir.to_path_buf())
    }

    #[test]
    fn test_destinations_differ_per_download() {
        let dir = Path::new("downloads");
        let first = TransferKey::new(ChatId(-100), MessageId(5), "AgADBQ");
        let second = TransferKey::new(ChatId(42), MessageId(9), "AgADBQ");

        assert_eq!(
            destination_in(dir, &first, &file(Some("clip.mp4"))),
            PathBuf::from("downloads/-100_5_AgADBQ_clip.mp4")
        );
        assert_eq!(destination_in(dir, &second, &file(None)), PathBuf::from("downloads/42_9_AgADBQ"));
    }

    #[tokio::test]
    async fn test_completed_transfer_is_reported_and_forgotten() {
        let transport = transport(Path::new("downloads"));
        let key = TransferKey::new(ChatId(1), MessageId(10), "AgADBQ");
        let path = PathBuf::from("downloads/1_10_AgADBQ_clip.mp4");
        transport
            .transfers
            .seed(&key, TransferState::Completed { path: path.clone(), size: 2048 });

        let progress = transport.poll_download(&key, &file(Some("clip.mp4"))).await.unwrap();
        assert_eq!(progress, DownloadProgress::completed(2048, path));
        assert_eq!(transport.transfers.len(), 0);
    }

    #[tokio::test]
    async fn test_failed_transfer_is_an_error() {
        let transport = transport(Path::new("downloads"));
        let key = TransferKey::new(ChatId(1), MessageId(10), "AgADBQ");
        transport
            .transfers
            .seed(&key, TransferState::Failed("Bad Request: file is too big".to_string()));

        let err = transport.poll_download(&key, &file(None)).await.unwrap_err();
        assert!(matches!(err, PlatformError::Download(reason) if reason.contains("too big")));
        assert_eq!(transport.transfers.len(), 0);
    }

    #[tokio::test]
    async fn test_finished_download_does_not_disturb_another() {
        let transport = transport(Path::new("downloads"));
        let first = TransferKey::new(ChatId(1), MessageId(10), "AgADBQ");
        let second = TransferKey::new(ChatId(2), MessageId(20), "AgADBQ");
        let path = PathBuf::from("downloads/1_10_AgADBQ");
        transport
            .transfers
            .seed(&first, TransferState::Completed { path: path.clone(), size: 2048 });
        transport.transfers.seed(&second, TransferState::Running(1024));

        let done = transport.poll_download(&first, &file(None)).await.unwrap();
        assert!(done.completed);

        let other = transport.poll_download(&second, &file(None)).await.unwrap();
        assert_eq!(other, DownloadProgress::running(1024));
        assert_eq!(transport.transfers.len(), 1);
    }

    #[tokio::test]
    async fn test_release_drops_state_and_partial_file() {
        let dir = std::env::temp_dir().join(format!("tgdl-release-{}", std::process::id()));
        fs::create_dir_all(&dir).await.unwrap();

        let transport = transport(&dir);
        let key = TransferKey::new(ChatId(1), MessageId(10), "AgADBQ");
        let media = file(Some("clip.mp4"));
        let partial = destination_in(&dir, &key, &media);
        fs::write(&partial, b"half").await.unwrap();
        transport.transfers.seed(&key, TransferState::Running(4));

        transport.release_download(&key, &media).await;

        assert_eq!(transport.transfers.len(), 0);
        assert!(!partial.exists());

        // nothing held, nothing to do
        transport.release_download(&key, &media).await;
        fs::remove_dir_all(&dir).await.unwrap();
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("song.mp3"), "song.mp3");
        assert_eq!(sanitize_file_name("my song (live).mp3"), "my_song__live_.mp3");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
    }
}
