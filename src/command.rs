use teloxide::{macros::BotCommands, prelude::Requester, types::BotCommand, Bot};

use crate::error::HandlerResult;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    Start,
    Help,
    Privacy,
    Ping,
    Download,
}

impl Command {
    pub fn user_commands() -> Vec<BotCommand> {
        vec![
            BotCommand::new("start", t!("commands.description.start")),
            BotCommand::new("help", t!("commands.description.help")),
            BotCommand::new("download", t!("commands.description.download")),
            BotCommand::new("privacy", t!("commands.description.privacy")),
            BotCommand::new("ping", t!("commands.description.ping")),
        ]
    }
}

pub async fn setup_user_commands(bot: &Bot) -> HandlerResult<()> {
    bot.delete_my_commands().await?;
    bot.set_my_commands(Command::user_commands()).await?;
    Ok(())
}
