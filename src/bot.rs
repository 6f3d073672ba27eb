use teloxide::adaptors::throttle::Limits;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::Bot;

use crate::config::AppConfig;
use crate::error::{BotResult, HandlerResult};
use crate::handler::get_handler;
use crate::state::AppState;
use crate::utils::http;

pub struct BotService {
    pub bot: Bot,
    pub state: AppState,
}

pub fn handler_tree() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    get_handler()
}

impl BotService {
    pub fn new(config: AppConfig) -> BotResult<Self> {
        let client = http::create_telegram_client()?;

        let mut bot = Bot::with_client(config.telegram.token.clone(), client);
        if let Some(api_url) = &config.telegram.api_url {
            info!("Using Bot API server at {}", api_url);
            bot = bot.set_api_url(api_url.clone());
        }

        info!("Initializing AppState...");
        let state = AppState::new(config, bot.clone().throttle(Limits::default()));
        info!("AppState initialized");

        Ok(Self { bot, state })
    }

    pub async fn start(&self) -> HandlerResult<()> {
        info!("Testing connection to Telegram API...");
        match self.bot.get_me().await {
            Ok(me) => info!("Successfully connected to Telegram API as @{}", me.username()),
            Err(e) => {
                error!("Failed to connect to Telegram API: {:?}", e);
                return Err(anyhow::anyhow!("Failed to connect to Telegram API: {}", e).into());
            }
        }

        crate::command::setup_user_commands(&self.bot).await?;

        Dispatcher::builder(self.bot.clone(), handler_tree())
            .dependencies(dptree::deps![self.state.clone()]) // tests inject their own AppState
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }
}
