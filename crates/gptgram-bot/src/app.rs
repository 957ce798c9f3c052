//! Shared application state handed to the Telegram dispatcher.

use gptgram_agent::dialog::DialogStore;
use gptgram_agent::pipeline::MessageContext;
use gptgram_agent::runtime::ModelRuntime;

/// Everything the message pipeline needs, owned in one place and shared
/// via `Arc`, with no module-level singletons.
pub struct AppState {
    model: ModelRuntime,
    dialogs: DialogStore,
}

impl AppState {
    pub fn new(model: ModelRuntime, dialogs: DialogStore) -> Self {
        Self { model, dialogs }
    }
}

impl MessageContext for AppState {
    fn model(&self) -> &ModelRuntime {
        &self.model
    }

    fn dialogs(&self) -> &DialogStore {
        &self.dialogs
    }
}
