use std::{
    fmt::{self, Display},
    path::PathBuf,
};

use teloxide::types::{ChatId, FileMeta, Message, MessageId, MessageKind};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Video,
    Audio,
    VoiceNote,
    VideoNote,
    Document,
    Text,
    Photo,
    Sticker,
    Animation,
    /// Any other payload, carrying the platform's name for it.
    Unknown(String),
}

impl ContentKind {
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            ContentKind::Text | ContentKind::Photo | ContentKind::Sticker | ContentKind::Animation
        )
    }
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Unknown(name) => write!(f, "{}", name),
            other => write!(f, "{:?}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub file_id: String,
    pub unique_id: String,
    pub size: u64,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

impl MediaFile {
    fn from_meta(meta: &FileMeta, file_name: Option<String>, mime_type: Option<String>) -> Self {
        Self {
            file_id: meta.id.clone(),
            unique_id: meta.unique_id.clone(),
            size: u64::from(meta.size),
            file_name,
            mime_type,
        }
    }
}

/// A chat message as seen by the downloader.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub kind: ContentKind,
    /// Present for file-bearing kinds.
    pub file: Option<MediaFile>,
}

impl MediaMessage {
    pub fn from_message(msg: &Message) -> Self {
        let (kind, file) = if let Some(video) = msg.video() {
            (
                ContentKind::Video,
                Some(MediaFile::from_meta(
                    &video.file,
                    video.file_name.clone(),
                    video.mime_type.as_ref().map(ToString::to_string),
                )),
            )
        } else if let Some(audio) = msg.audio() {
            (
                ContentKind::Audio,
                Some(MediaFile::from_meta(
                    &audio.file,
                    audio.file_name.clone(),
                    audio.mime_type.as_ref().map(ToString::to_string),
                )),
            )
        } else if let Some(voice) = msg.voice() {
            (
                ContentKind::VoiceNote,
                Some(MediaFile::from_meta(
                    &voice.file,
                    None,
                    voice.mime_type.as_ref().map(ToString::to_string),
                )),
            )
        } else if let Some(note) = msg.video_note() {
            (ContentKind::VideoNote, Some(MediaFile::from_meta(&note.file, None, None)))
        } else if msg.animation().is_some() {
            (ContentKind::Animation, None)
        } else if let Some(document) = msg.document() {
            (
                ContentKind::Document,
                Some(MediaFile::from_meta(
                    &document.file,
                    document.file_name.clone(),
                    document.mime_type.as_ref().map(ToString::to_string),
                )),
            )
        } else if msg.photo().is_some() {
            (ContentKind::Photo, None)
        } else if msg.sticker().is_some() {
            (ContentKind::Sticker, None)
        } else if msg.text().is_some() {
            (ContentKind::Text, None)
        } else {
            (ContentKind::Unknown(describe_kind(msg)), None)
        };

        Self {
            chat_id: msg.chat.id,
            message_id: msg.id,
            kind,
            file,
        }
    }

    pub fn carries_file(msg: &Message) -> bool {
        msg.video().is_some()
            || msg.audio().is_some()
            || msg.voice().is_some()
            || msg.video_note().is_some()
            || msg.document().is_some()
    }
}

// "Contact(MediaContact { .. })" -> "Contact"
fn describe_kind(msg: &Message) -> String {
    let debug = match &msg.kind {
        MessageKind::Common(common) => format!("{:?}", common.media_kind),
        other => format!("{:?}", other),
    };

    debug
        .split(|c: char| c == '(' || c == '{' || c.is_whitespace())
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Identifies one download: the same file fetched from two status messages
/// gets two keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransferKey {
    pub chat_id: ChatId,
    pub status_message: MessageId,
    pub unique_id: String,
}

impl TransferKey {
    pub fn new(chat_id: ChatId, status_message: MessageId, unique_id: &str) -> Self {
        Self {
            chat_id,
            status_message,
            unique_id: unique_id.to_string(),
        }
    }
}

impl Display for TransferKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.chat_id.0, self.status_message.0, self.unique_id)
    }
}

/// One poll of a file transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadProgress {
    pub downloaded: u64,
    pub completed: bool,
    pub local_path: Option<PathBuf>,
}

impl DownloadProgress {
    pub fn running(downloaded: u64) -> Self {
        Self {
            downloaded,
            completed: false,
            local_path: None,
        }
    }

    pub fn completed(downloaded: u64, local_path: PathBuf) -> Self {
        Self {
            downloaded,
            completed: true,
            local_path: Some(local_path),
        }
    }
}
