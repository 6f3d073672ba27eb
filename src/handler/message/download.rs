use teloxide::{
    payloads::SendMessageSetters,
    prelude::Requester,
    types::{Message, ParseMode, ReplyParameters},
    Bot,
};

use crate::{
    error::HandlerResult,
    platform::MediaMessage,
    service::download::{progress::format_bytes, DownloadError, DownloadedMedia},
    state::AppState,
};

/// Validates `target` and, when it is downloadable, runs the download in a
/// task of its own so the chat keeps receiving updates meanwhile.
pub async fn run_download(bot: &Bot, msg: &Message, target: Option<MediaMessage>, state: &AppState) -> HandlerResult<()> {
    let downloads = state.service_registry.download.clone();

    if !downloads.validator().is_valid(target.as_ref()) {
        let max_size = format_bytes(downloads.validator().max_file_size());
        bot.send_message(msg.chat.id, t!("download.invalid_media", max_size = max_size))
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    }

    let bot = bot.clone();
    let chat_id = msg.chat.id;
    tokio::spawn(async move {
        let result = downloads.download(target.as_ref()).await;
        match &result {
            Ok(media) => info!("Download {} finished at {}", media.label(), media.completed_at),
            Err(e) => info!("Download in chat {} ended with {}", chat_id, e.label()),
        }

        let Some(reply) = outcome_reply(&result, downloads.validator().max_file_size()) else {
            return;
        };

        if let Err(e) = bot.send_message(chat_id, reply).parse_mode(ParseMode::Html).await {
            warn!("Failed to report download result in chat {}: {}", chat_id, e);
        }
    });

    Ok(())
}

/// Follow-up reply for a finished download. A failed transfer gets none: its
/// status message already shows the error.
fn outcome_reply(result: &Result<DownloadedMedia, DownloadError>, max_file_size: u64) -> Option<String> {
    let reply = match result {
        Ok(media) => t!(
            "download.saved",
            file_name = teloxide::utils::html::escape(&media.file_name),
            size = format_bytes(media.size)
        ),
        Err(DownloadError::DownloadFailed(_)) => return None,
        Err(e @ DownloadError::ErrorSendingMessage(_)) => {
            t!("download.send_failed", error = teloxide::utils::html::escape(&e.to_string()))
        }
        Err(DownloadError::InvalidMedia) => t!("download.invalid_media", max_size = format_bytes(max_file_size)),
    };

    Some(reply.to_string())
}
