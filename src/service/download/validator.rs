use crate::{
    config::DownloadConfig,
    platform::{ContentKind, MediaFile, MediaMessage},
};

pub const UNKNOWN_MEDIA_NAME: &str = "UnknownMedia";

type DefaultName = fn(&MediaFile) -> &'static str;

/// How a supported kind names its file.
struct FileNaming {
    honor_platform_name: bool,
    default_name: DefaultName,
}

fn is_audio_or_video(file: &MediaFile) -> bool {
    file.mime_type
        .as_deref()
        .map(str::to_lowercase)
        .is_some_and(|mime| mime.starts_with("audio/") || mime.starts_with("video/"))
}

impl FileNaming {
    fn new(honor_platform_name: bool, default_name: DefaultName) -> Self {
        Self {
            honor_platform_name,
            default_name,
        }
    }
}

// One entry per supported kind.
fn file_naming(kind: &ContentKind) -> Option<FileNaming> {
    let naming = match kind {
        ContentKind::Video => FileNaming::new(true, |_| "Video.mp4"),
        ContentKind::Audio => FileNaming::new(true, |_| "Audio.mp3"),
        ContentKind::VoiceNote => FileNaming::new(false, |_| "VoiceNote.ogg"),
        ContentKind::VideoNote => FileNaming::new(false, |_| "VideoNote.mp4"),
        ContentKind::Document => FileNaming::new(true, |file| {
            if is_audio_or_video(file) {
                "Document.mp4"
            } else {
                "Document.IDK"
            }
        }),
        _ => return None,
    };

    Some(naming)
}

#[derive(Debug, Clone)]
pub struct MediaValidator {
    max_file_size: u64,
    accept_non_media_documents: bool,
}

impl MediaValidator {
    pub fn new(config: &DownloadConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            accept_non_media_documents: config.accept_non_media_documents,
        }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn is_valid(&self, message: Option<&MediaMessage>) -> bool {
        let Some(message) = message else {
            return false;
        };

        if message.kind.is_unsupported() {
            return false;
        }

        if !self.accept_non_media_documents
            && message.kind == ContentKind::Document
            && !message.file.as_ref().is_some_and(is_audio_or_video)
        {
            info!("Rejected non-media document in chat {}", message.chat_id);
            return false;
        }

        let (file_size, _) = self.extract_file_info(message);
        if file_size == 0 || file_size > self.max_file_size {
            info!("Invalid file size: {}", file_size);
            return false;
        }

        true
    }

    /// Size and file name of the payload; `(0, "UnknownMedia")` when there is none.
    pub fn extract_file_info(&self, message: &MediaMessage) -> (u64, String) {
        let naming = file_naming(&message.kind);

        if let (Some(naming), Some(file)) = (naming, message.file.as_ref()) {
            let name = file
                .file_name
                .as_deref()
                .filter(|name| naming.honor_platform_name && !name.is_empty())
                .unwrap_or_else(|| (naming.default_name)(file));

            return (file.size, name.to_string());
        }

        info!("Unknown or unsupported content type: {}", message.kind);
        (0, UNKNOWN_MEDIA_NAME.to_string())
    }
}
