use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, Me};
use url::Url;

use crate::{
    config::SupportConfig,
    error::{BotError, BotResult},
    service::help::HelpCategory,
};

fn close_button() -> InlineKeyboardButton {
    InlineKeyboardButton::callback(t!("buttons.close"), "help_close")
}

fn help_button() -> InlineKeyboardButton {
    InlineKeyboardButton::callback(t!("buttons.help"), "help_all")
}

fn category_button(category: HelpCategory) -> InlineKeyboardButton {
    let text = match category {
        HelpCategory::User => t!("buttons.user"),
        HelpCategory::Admin => t!("buttons.admin"),
        HelpCategory::Owner => t!("buttons.owner"),
        HelpCategory::Devs => t!("buttons.devs"),
    };
    InlineKeyboardButton::callback(text, category.callback_data())
}

fn support_row(support: &SupportConfig) -> Vec<InlineKeyboardButton> {
    vec![
        InlineKeyboardButton::url(t!("buttons.updates"), support.channel.clone()),
        InlineKeyboardButton::url(t!("buttons.support"), support.group.clone()),
    ]
}

pub fn get_support_keyboard(support: &SupportConfig) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([support_row(support), vec![close_button()]])
}

pub fn get_add_me_keyboard(me: &Me, support: &SupportConfig) -> BotResult<InlineKeyboardMarkup> {
    let mut add_me_url = me.tme_url();
    add_me_url.set_query(Some("startgroup=true"));

    let owner_url = Url::parse(&format!("https://t.me/{}", support.owner_username))
        .map_err(|e| BotError::InvalidUrl(format!("{}: {}", support.owner_username, e)))?;

    Ok(InlineKeyboardMarkup::new([
        vec![InlineKeyboardButton::url(t!("buttons.add_me"), add_me_url)],
        vec![help_button()],
        vec![InlineKeyboardButton::url(t!("buttons.owner_link"), owner_url)],
        support_row(support),
    ]))
}

pub fn get_help_menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([
        [category_button(HelpCategory::User), category_button(HelpCategory::Admin)],
        [category_button(HelpCategory::Owner), category_button(HelpCategory::Devs)],
        [
            close_button(),
            InlineKeyboardButton::callback(t!("buttons.home"), "help_back"),
        ],
    ])
}

pub fn get_back_to_help_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([[help_button(), close_button()]])
}

/// Rendered under every progress message; pressing it is acknowledged only.
pub fn get_stop_download_keyboard(unique_file_id: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([[InlineKeyboardButton::callback(
        t!("buttons.stop_download"),
        format!("cancel_{}", unique_file_id),
    )]])
}
