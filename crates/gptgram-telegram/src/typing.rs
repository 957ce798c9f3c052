//! Telegram typing indicator.
//!
//! Telegram's typing status expires after ~5 seconds, so the guard
//! refreshes `sendChatAction` every 4 seconds until it is dropped.

use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::ChatAction;

/// Keeps the "typing..." indicator alive for as long as the guard lives.
/// Dropping it aborts the refresh loop.
pub struct TypingGuard(tokio::task::JoinHandle<()>);

impl TypingGuard {
    /// Send `ChatAction::Typing` immediately, then every 4 seconds.
    pub fn start(bot: Bot, chat_id: ChatId) -> Self {
        let handle = tokio::spawn(async move {
            loop {
                let _ = bot.send_chat_action(chat_id, ChatAction::Typing).await;
                tokio::time::sleep(Duration::from_secs(4)).await;
            }
        });
        TypingGuard(handle)
    }
}

impl Drop for TypingGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}
