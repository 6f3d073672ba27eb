use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use teloxide::net::default_reqwest_settings;

use crate::error::{BotError, BotResult};

pub const DEFAULT_USER_AGENT: &str = concat!("tgdl/", env!("CARGO_PKG_VERSION"));

/// Upper bound for one request. File streams share this client, so it has to
/// cover a full 400 MB transfer rather than a Bot API round trip.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60 * 60);

pub fn create_telegram_client() -> BotResult<Client> {
    let builder = default_reqwest_settings()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(60))
        .tcp_keepalive(Duration::from_secs(30))
        .user_agent(DEFAULT_USER_AGENT);

    build_client(builder)
}

fn build_client(builder: ClientBuilder) -> BotResult<Client> {
    builder
        .build()
        .map_err(|e| BotError::Other(anyhow::anyhow!("Failed to build HTTP client: {}", e)))
}
