use shuttle_runtime::Error as ShuttleError;
use teloxide::RequestError;

use crate::config::ConfigError;
use crate::platform::PlatformError;

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Platform error: {0}")]
    PlatformError(#[from] PlatformError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Telegram error: {0}")]
    Telegram(#[from] RequestError),

    #[error(transparent)]
    Other(anyhow::Error),
}

impl From<BotError> for ShuttleError {
    fn from(error: BotError) -> Self {
        ShuttleError::Custom(anyhow::anyhow!(error))
    }
}

impl From<anyhow::Error> for BotError {
    fn from(error: anyhow::Error) -> Self {
        BotError::Other(error)
    }
}

impl From<ConfigError> for ShuttleError {
    fn from(error: ConfigError) -> Self {
        BotError::from(error).into()
    }
}

pub type HandlerResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub type BotResult<T> = Result<T, BotError>;
