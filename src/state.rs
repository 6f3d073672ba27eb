use std::sync::Arc;

use teloxide::adaptors::Throttle;
use teloxide::Bot;

use crate::{
    config::AppConfig,
    platform::{ChatTransport, TelegramTransport},
    service::ServiceRegistry,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub service_registry: ServiceRegistry,
}

impl AppState {
    pub fn new(config: AppConfig, bot: Throttle<Bot>) -> Self {
        let transport = TelegramTransport::new(bot, config.download.download_dir.clone());
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: AppConfig, transport: Arc<dyn ChatTransport>) -> Self {
        let service_registry = ServiceRegistry::new(&config, transport);

        Self {
            config: Arc::new(config),
            service_registry,
        }
    }
}
