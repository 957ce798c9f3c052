//! Shared context interface for transport adapters.
//!
//! `MessageContext` is the single trait a channel host must implement.
//! It is defined here (in `gptgram-agent`) so the adapter crates depend on
//! the pipeline rather than the other way around, and so tests can drive
//! the pipeline with an in-process context instead of process-wide state.

use crate::dialog::DialogStore;
use crate::runtime::ModelRuntime;

/// Minimal context interface required by the message pipeline.
///
/// Implemented by `AppState` in `gptgram-bot`.
pub trait MessageContext: Send + Sync {
    fn model(&self) -> &ModelRuntime;
    fn dialogs(&self) -> &DialogStore;
}
