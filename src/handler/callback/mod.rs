mod help;

use teloxide::{
    dispatching::UpdateHandler,
    prelude::*,
    types::{CallbackQuery, Me},
};

use crate::{
    error::HandlerResult,
    service::help::HelpAction,
    state::AppState,
};

async fn handle_callback(bot: Bot, q: CallbackQuery, me: Me, state: AppState) -> HandlerResult<()> {
    let data = q.data.clone().unwrap_or_default();
    let action = HelpAction::parse(&data);
    let help = &state.service_registry.help;

    debug!("Callback {:?} from user {}", action, q.from.id);

    let answer = match (&action, q.message.as_ref()) {
        (HelpAction::CancelDownload(unique_id), _) => {
            info!("Stop requested for download {}", unique_id);
            Some(t!("help.cancel_inert").to_string())
        }
        (HelpAction::Unknown(data), _) => Some(t!("help.unknown_action", data = data).to_string()),
        (_, None) => None,
        (HelpAction::Menu, Some(message)) => {
            help::handle_callback_help_menu(&bot, message, help).await?;
            Some(t!("help.answer.all").to_string())
        }
        (HelpAction::Home, Some(message)) => {
            help::handle_callback_help_home(&bot, message, help, &me, &q.from.first_name).await?;
            None
        }
        (HelpAction::Category(category), Some(message)) => {
            help::handle_callback_help_category(&bot, message, help, *category).await?;
            Some(help.category_answer(*category))
        }
        (HelpAction::Close, Some(message)) => {
            help::handle_callback_help_close(&bot, message).await?;
            None
        }
    };

    let mut request = bot.answer_callback_query(&q.id).cache_time(1);
    if let Some(text) = answer {
        request = request.text(text);
    }
    request.await?;

    Ok(())
}

pub fn get_callback_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync>> {
    Update::filter_callback_query().endpoint(handle_callback)
}
