//! Telegram channel adapter.
//!
//! Wraps a teloxide `Bot` + `Dispatcher` and drives the long-polling event
//! loop until the process exits. Long polling, so no public URL is required.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::info;

use gptgram_core::config::TelegramConfig;

use crate::context::TelegramAppContext;
use crate::handler::handle_message;

pub struct TelegramAdapter<C: TelegramAppContext + 'static> {
    ctx: Arc<C>,
    config: TelegramConfig,
}

impl<C: TelegramAppContext + 'static> TelegramAdapter<C> {
    pub fn new(config: &TelegramConfig, ctx: Arc<C>) -> Self {
        Self {
            ctx,
            config: config.clone(),
        }
    }

    /// Connect to Telegram and drive the long-polling loop.
    ///
    /// Never returns; runs for the lifetime of the process.
    pub async fn run(self) {
        let bot = Bot::new(&self.config.bot_token);

        info!("telegram: starting long-polling dispatcher");

        let ctx = Arc::clone(&self.ctx);
        let handler = Update::filter_message().endpoint(handle_message::<C>);

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![ctx])
            .default_handler(|_upd| async {})
            .build()
            .dispatch()
            .await;
    }
}
