//! Telegram context interface, re-exported from the shared pipeline.
//!
//! `TelegramAppContext` is an alias for `gptgram_agent::pipeline::MessageContext`,
//! implemented by `AppState` in the binary.

pub use gptgram_agent::pipeline::MessageContext as TelegramAppContext;
