#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("Invalid or unsupported media file.")]
    InvalidMedia,
    #[error("could not send status message: {0}")]
    ErrorSendingMessage(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
}

impl DownloadError {
    pub fn label(&self) -> &'static str {
        match self {
            DownloadError::InvalidMedia => "InvalidMedia",
            DownloadError::ErrorSendingMessage(_) => "ErrorSendingMessage",
            DownloadError::DownloadFailed(_) => "DownloadFailed",
        }
    }
}
