use std::time::Instant;

use teloxide::dispatching::{HandlerExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{Me, ParseMode};

use crate::command::Command;
use crate::error::HandlerResult;
use crate::platform::MediaMessage;
use crate::state::AppState;

use super::keyboard::{get_add_me_keyboard, get_support_keyboard};
use super::message::run_download;

fn is_group(msg: &Message) -> bool {
    msg.chat.is_group() || msg.chat.is_supergroup()
}

async fn handle_start(bot: Bot, msg: Message, me: Me, state: AppState) -> HandlerResult<()> {
    let help = &state.service_registry.help;
    let first_name = msg.from.as_ref().map(|user| user.first_name.as_str()).unwrap_or_default();

    if is_group(&msg) {
        bot.send_message(msg.chat.id, help.start_text(first_name, &me.first_name, true))
            .parse_mode(ParseMode::Html)
            .reply_markup(get_support_keyboard(help.support()))
            .await?;
    } else {
        bot.send_message(msg.chat.id, help.start_text(first_name, &me.first_name, false))
            .parse_mode(ParseMode::Html)
            .reply_markup(get_add_me_keyboard(&me, help.support())?)
            .await?;
    }

    Ok(())
}

async fn handle_privacy(bot: Bot, msg: Message, me: Me, state: AppState) -> HandlerResult<()> {
    bot.send_message(msg.chat.id, state.service_registry.help.privacy_text(&me.first_name))
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}

async fn handle_ping(bot: Bot, msg: Message) -> HandlerResult<()> {
    let started = Instant::now();
    let reply = bot.send_message(msg.chat.id, t!("ping.pending")).await?;
    let latency = started.elapsed().as_millis();

    bot.edit_message_text(msg.chat.id, reply.id, t!("ping.result", latency = latency))
        .await?;

    Ok(())
}

async fn handle_download(bot: Bot, msg: Message, state: AppState) -> HandlerResult<()> {
    let target = msg.reply_to_message().map(MediaMessage::from_message);
    run_download(&bot, &msg, target, &state).await
}

async fn handle_command(bot: Bot, msg: Message, me: Me, cmd: Command, state: AppState) -> HandlerResult<()> {
    debug!("Received {:?} in chat {}", cmd, msg.chat.id);

    match cmd {
        Command::Start | Command::Help => handle_start(bot, msg, me, state).await?,
        Command::Privacy => handle_privacy(bot, msg, me, state).await?,
        Command::Ping => handle_ping(bot, msg).await?,
        Command::Download => handle_download(bot, msg, state).await?,
    }

    Ok(())
}

pub fn get_command_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync>> {
    Update::filter_message()
        .filter_command::<Command>()
        .endpoint(handle_command)
}
