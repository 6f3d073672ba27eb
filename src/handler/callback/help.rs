use teloxide::{
    payloads::EditMessageTextSetters,
    prelude::Requester,
    types::{MaybeInaccessibleMessage, Me, ParseMode},
    Bot,
};

use crate::{
    error::HandlerResult,
    handler::keyboard::{get_add_me_keyboard, get_back_to_help_keyboard, get_help_menu_keyboard},
    service::help::{HelpCategory, HelpService},
};

pub(super) async fn handle_callback_help_menu(
    bot: &Bot,
    message: &MaybeInaccessibleMessage,
    help: &HelpService,
) -> HandlerResult<()> {
    bot.edit_message_text(message.chat().id, message.id(), help.menu_text())
        .parse_mode(ParseMode::Html)
        .reply_markup(get_help_menu_keyboard())
        .await?;

    Ok(())
}

pub(super) async fn handle_callback_help_home(
    bot: &Bot,
    message: &MaybeInaccessibleMessage,
    help: &HelpService,
    me: &Me,
    first_name: &str,
) -> HandlerResult<()> {
    bot.edit_message_text(
        message.chat().id,
        message.id(),
        help.start_text(first_name, &me.first_name, false),
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(get_add_me_keyboard(me, help.support())?)
    .await?;

    Ok(())
}

pub(super) async fn handle_callback_help_category(
    bot: &Bot,
    message: &MaybeInaccessibleMessage,
    help: &HelpService,
    category: HelpCategory,
) -> HandlerResult<()> {
    bot.edit_message_text(message.chat().id, message.id(), help.category_text(category))
        .parse_mode(ParseMode::Html)
        .reply_markup(get_back_to_help_keyboard())
        .await?;

    Ok(())
}

pub(super) async fn handle_callback_help_close(bot: &Bot, message: &MaybeInaccessibleMessage) -> HandlerResult<()> {
    bot.delete_message(message.chat().id, message.id()).await?;
    Ok(())
}
