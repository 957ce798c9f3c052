use async_trait::async_trait;

use gptgram_core::types::{Role, Turn};

/// Request to a completion endpoint.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Fully-qualified model URI, e.g. `gpt://<folder>/yandexgpt-lite/latest`.
    pub model_uri: String,
    /// Ordered transcript. At most one system turn, always first.
    pub turns: Vec<Turn>,
    /// Sampling temperature, range [0.0, 1.0].
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Per-call token usage reported by the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    pub input_text_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Response from a completion endpoint (one generated alternative).
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub text: String,
    pub role: Role,
    /// Alternative status, e.g. `ALTERNATIVE_STATUS_FINAL`.
    pub status: String,
    /// Absent when the endpoint omits usage data.
    pub usage: Option<Usage>,
    pub model_version: String,
}

/// Common interface to completion endpoints.
///
/// The pipeline depends only on this trait; the concrete YandexGPT client
/// lives in `yandex.rs` and tests substitute in-process mocks.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logging and error messages.
    fn name(&self) -> &str;

    /// Send a completion request and wait for the full response.
    async fn complete(&self, req: &CompletionRequest) -> Result<CompletionResponse, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}
