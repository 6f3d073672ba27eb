mod model;

pub use model::*;

use crate::config::SupportConfig;

use super::download::progress::format_bytes;

/// Renders the static welcome, privacy and help pages.
#[derive(Debug, Clone)]
pub struct HelpService {
    support: SupportConfig,
    max_file_size: u64,
}

impl HelpService {
    pub fn new(support: SupportConfig, max_file_size: u64) -> Self {
        Self { support, max_file_size }
    }

    pub fn support(&self) -> &SupportConfig {
        &self.support
    }

    pub fn start_text(&self, first_name: &str, bot_name: &str, in_group: bool) -> String {
        let first_name = teloxide::utils::html::escape(first_name);
        let bot_name = teloxide::utils::html::escape(bot_name);

        if in_group {
            t!(
                "start.group",
                first_name = first_name,
                bot_name = bot_name,
                support_group = self.support.group.as_str()
            )
            .to_string()
        } else {
            t!(
                "start.private",
                first_name = first_name,
                bot_name = bot_name,
                version = env!("CARGO_PKG_VERSION")
            )
            .to_string()
        }
    }

    pub fn privacy_text(&self, bot_name: &str) -> String {
        t!(
            "privacy.text",
            bot_name = teloxide::utils::html::escape(bot_name),
            support_group = self.support.group.as_str()
        )
        .to_string()
    }

    pub fn menu_text(&self) -> String {
        t!("help.menu").to_string()
    }

    pub fn category_text(&self, category: HelpCategory) -> String {
        match category {
            HelpCategory::User => t!("help.user"),
            HelpCategory::Admin => t!("help.admin"),
            HelpCategory::Owner => t!("help.owner", max_size = format_bytes(self.max_file_size)),
            HelpCategory::Devs => t!("help.devs"),
        }
        .to_string()
    }

    /// Short toast shown when a category button is pressed.
    pub fn category_answer(&self, category: HelpCategory) -> String {
        match category {
            HelpCategory::User => t!("help.answer.user"),
            HelpCategory::Admin => t!("help.answer.admin"),
            HelpCategory::Owner => t!("help.answer.owner"),
            HelpCategory::Devs => t!("help.answer.devs"),
        }
        .to_string()
    }
}
