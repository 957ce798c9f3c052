use tokio::sync::RwLock;
use tracing::info;

use gptgram_core::types::Turn;

use crate::provider::{CompletionProvider, CompletionRequest, CompletionResponse, ProviderError};

/// Central model runtime. Holds the completion provider and the sampling
/// configuration. Shared across all handler tasks via Arc in AppState.
///
/// The temperature is process-wide: a /temp issued by any user changes it
/// for everyone. Keeping the knob behind this type means a per-user
/// override map with a global fallback can be added here without touching
/// call sites.
pub struct ModelRuntime {
    provider: Box<dyn CompletionProvider>,
    model_uri: String,
    max_tokens: u32,
    temperature: RwLock<f64>,
}

impl ModelRuntime {
    pub fn new(
        provider: Box<dyn CompletionProvider>,
        model_uri: String,
        max_tokens: u32,
        temperature: f64,
    ) -> Self {
        Self {
            provider,
            model_uri,
            max_tokens,
            temperature: RwLock::new(temperature),
        }
    }

    /// Access the completion provider directly.
    pub fn provider(&self) -> &dyn CompletionProvider {
        &*self.provider
    }

    pub fn model_uri(&self) -> &str {
        &self.model_uri
    }

    /// Current shared sampling temperature.
    pub async fn temperature(&self) -> f64 {
        *self.temperature.read().await
    }

    /// Change the shared temperature at runtime. Returns the previous value.
    /// Range validation happens at the command layer.
    pub async fn set_temperature(&self, temperature: f64) -> f64 {
        let mut guard = self.temperature.write().await;
        std::mem::replace(&mut *guard, temperature)
    }

    /// Submit an assembled transcript to the completion endpoint using the
    /// current sampling configuration.
    pub async fn complete(&self, turns: Vec<Turn>) -> Result<CompletionResponse, ProviderError> {
        let req = CompletionRequest {
            model_uri: self.model_uri.clone(),
            turns,
            temperature: self.temperature().await,
            max_tokens: self.max_tokens,
        };
        info!(
            model_uri = %req.model_uri,
            provider = %self.provider.name(),
            turns = req.turns.len(),
            temperature = req.temperature,
            "processing completion request"
        );
        self.provider.complete(&req).await
    }
}

/// Build the fully-qualified model URI for a folder-scoped model,
/// e.g. `gpt://b1gabcdef/yandexgpt-lite/latest`.
pub fn model_uri(folder_id: &str, model_name: &str) -> String {
    format!("gpt://{folder_id}/{model_name}/latest")
}
