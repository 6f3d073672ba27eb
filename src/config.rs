use std::{path::PathBuf, str::FromStr, time::Duration};

use shuttle_runtime::SecretStore;
use url::Url;

pub const MIB: u64 = 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing {0}")]
    Missing(&'static str),
    #[error("Invalid {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub download: DownloadConfig,
    pub support: SupportConfig,
}

#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub token: String,
    /// Local Bot API server, required for files above 20 MB.
    pub api_url: Option<Url>,
}

#[derive(Clone, Debug)]
pub struct DownloadConfig {
    pub download_dir: PathBuf,
    pub max_file_size: u64,
    pub poll_interval: Duration,
    pub max_progress_edits: u32,
    /// `None` polls until the platform reports completion.
    pub max_poll_attempts: Option<u32>,
    pub accept_non_media_documents: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("downloads"),
            max_file_size: 400 * MIB,
            poll_interval: Duration::from_secs(2),
            max_progress_edits: 6,
            max_poll_attempts: None,
            accept_non_media_documents: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SupportConfig {
    pub channel: Url,
    pub group: Url,
    pub owner_username: String,
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            channel: Url::parse("https://t.me/FallenProjects").expect("static url"),
            group: Url::parse("https://t.me/GuardxSupport").expect("static url"),
            owner_username: "AshokShau".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_secrets(secret_store: &SecretStore) -> Result<Self, ConfigError> {
        build_config(|key| secret_store.get(key))
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn optional<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
        _ => Ok(None),
    }
}

pub fn build_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    info!("Building AppConfig...");

    let defaults = DownloadConfig::default();
    let support_defaults = SupportConfig::default();

    let config = AppConfig {
        telegram: TelegramConfig {
            token: required(&lookup, "TELEGRAM_BOT_TOKEN")?,
            api_url: optional::<_, Url>(&lookup, "TELEGRAM_API_URL")?,
        },
        download: DownloadConfig {
            download_dir: optional::<_, PathBuf>(&lookup, "DOWNLOAD_DIR")?.unwrap_or(defaults.download_dir),
            max_file_size: match optional::<_, u64>(&lookup, "MAX_FILE_SIZE_MB")? {
                Some(mb) => mb.checked_mul(MIB).ok_or_else(|| ConfigError::Invalid {
                    key: "MAX_FILE_SIZE_MB",
                    value: mb.to_string(),
                })?,
                None => defaults.max_file_size,
            },
            poll_interval: optional::<_, u64>(&lookup, "POLL_INTERVAL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_interval),
            max_progress_edits: optional(&lookup, "MAX_PROGRESS_EDITS")?.unwrap_or(defaults.max_progress_edits),
            max_poll_attempts: optional(&lookup, "MAX_POLL_ATTEMPTS")?,
            accept_non_media_documents: optional(&lookup, "ACCEPT_NON_MEDIA_DOCUMENTS")?
                .unwrap_or(defaults.accept_non_media_documents),
        },
        support: SupportConfig {
            channel: optional(&lookup, "SUPPORT_CHANNEL")?.unwrap_or(support_defaults.channel),
            group: optional(&lookup, "SUPPORT_GROUP")?.unwrap_or(support_defaults.group),
            owner_username: optional(&lookup, "OWNER_USERNAME")?.unwrap_or(support_defaults.owner_username),
        },
    };

    info!("AppConfig built");

    Ok(config)
}

#[cfg(test)]
impl AppConfig {
    pub fn new_test_config() -> Self {
        Self {
            telegram: TelegramConfig {
                token: "1234567890:TEST_TOKEN".to_string(),
                api_url: None,
            },
            download: DownloadConfig::default(),
            support: SupportConfig::default(),
        }
    }
}
