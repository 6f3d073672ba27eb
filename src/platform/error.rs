use teloxide::RequestError;

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("request error: {0}")]
    Request(#[from] RequestError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("download error: {0}")]
    Download(String),
    #[error("download did not complete after {0} polls")]
    Timeout(u32),
}
