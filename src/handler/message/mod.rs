mod download;

use teloxide::{
    dispatching::{UpdateFilterExt, UpdateHandler},
    dptree,
    prelude::Requester,
    types::{Message, Update},
    Bot,
};

use crate::{error::HandlerResult, platform::MediaMessage, state::AppState};

pub use download::run_download;

async fn handle_private_media(bot: Bot, msg: Message, state: AppState) -> HandlerResult<()> {
    let target = MediaMessage::from_message(&msg);
    run_download(&bot, &msg, Some(target), &state).await
}

pub async fn handle_unknown_command(bot: Bot, msg: Message) -> HandlerResult<()> {
    bot.send_message(msg.chat.id, t!("commands.unknown_command")).await?;
    Ok(())
}

pub fn get_message_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync>> {
    Update::filter_message()
        .filter(|msg: Message| msg.chat.is_private())
        .branch(dptree::filter(|msg: Message| MediaMessage::carries_file(&msg)).endpoint(handle_private_media))
        .branch(
            dptree::filter(|msg: Message| msg.text().is_some_and(|text| text.starts_with('/')))
                .endpoint(handle_unknown_command),
        )
}
