use std::sync::Arc;

use crate::{config::AppConfig, platform::ChatTransport};

pub mod download;
pub mod help;

pub use download::DownloadService;
pub use help::HelpService;

#[derive(Clone)]
pub struct ServiceRegistry {
    pub download: DownloadService,
    pub help: HelpService,
}

impl ServiceRegistry {
    pub fn new(config: &AppConfig, transport: Arc<dyn ChatTransport>) -> Self {
        info!("Initializing service registry");

        let download = DownloadService::new(&config.download, transport);
        let help = HelpService::new(config.support.clone(), config.download.max_file_size);

        info!("Service registry initialized");

        Self { download, help }
    }
}
