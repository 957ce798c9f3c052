//! Telegram message handler registered in the teloxide Dispatcher.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::warn;

use gptgram_agent::pipeline::{handle_command, process_content_message};
use gptgram_core::types::UserId;

use crate::context::TelegramAppContext;
use crate::send;
use crate::typing::TypingGuard;

/// Shown when the completion endpoint fails. The real cause goes to the
/// log, not to the chat.
const GENERIC_ERROR: &str =
    "Something went wrong while talking to the model. Please try again in a moment.";

/// Main message handler. Runs for every incoming `Message`:
///
/// 1. Bot-message and empty-text filter
/// 2. Control commands answered inline (they never suspend on the endpoint)
/// 3. Content messages spawned into their own task, so one user awaiting a
///    completion does not hold up the dispatcher; ordering for a single
///    user is enforced by the dialog lock inside the pipeline
pub async fn handle_message<C: TelegramAppContext + 'static>(
    bot: Bot,
    msg: Message,
    ctx: Arc<C>,
) -> ResponseResult<()> {
    // Ignore messages from other bots.
    if msg.from.as_ref().map(|u| u.is_bot).unwrap_or(false) {
        return Ok(());
    }

    let from = match msg.from.as_ref() {
        Some(u) => u,
        None => return Ok(()),
    };
    let user = UserId::from(from.id.0);

    let text = match msg.text() {
        Some(t) if !t.trim().is_empty() => t,
        _ => return Ok(()),
    };

    if let Some(reply) = handle_command(text, ctx.as_ref(), &user).await {
        send::send_reply(&bot, msg.chat.id, &reply).await;
        return Ok(());
    }

    let chat_id = msg.chat.id;
    let text = text.to_string();
    tokio::spawn(async move {
        let _typing = TypingGuard::start(bot.clone(), chat_id);

        match process_content_message(ctx.as_ref(), &user, &text).await {
            Ok(reply) => send::send_reply(&bot, chat_id, &reply).await,
            Err(e) => {
                warn!(error = %e, user = %user, "telegram: completion pipeline failed");
                if let Err(e) = bot.send_message(chat_id, GENERIC_ERROR).await {
                    warn!(error = %e, "telegram: failed to send error reply");
                }
            }
        }
    });

    Ok(())
}
