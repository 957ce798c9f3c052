use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Top-level config (gptgram.toml + GPTGRAM_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GptgramConfig {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required.
    #[serde(default)]
    pub bot_token: String,
}

/// YandexGPT completion endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Yandex Cloud API key. Required.
    #[serde(default)]
    pub api_key: String,
    /// Yandex Cloud folder id, routes the request and forms the model URI. Required.
    #[serde(default)]
    pub folder_id: String,
    /// Model name within the folder, e.g. "yandexgpt-lite" or "yandexgpt".
    #[serde(default = "default_model_name")]
    pub name: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Initial sampling temperature, range [0.0, 1.0]. Shared by all users;
    /// mutable at runtime via /temp.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            folder_id: String::new(),
            name: default_model_name(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Conversation history settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Upper bound on non-system turns included in a completion request.
    /// Absent means the full transcript is sent every time.
    #[serde(default)]
    pub max_turns: Option<usize>,
}

fn default_model_name() -> String {
    "yandexgpt-lite".to_string()
}
fn default_base_url() -> String {
    "https://llm.api.cloud.yandex.net".to_string()
}
fn default_temperature() -> f64 {
    0.5
}
fn default_max_tokens() -> u32 {
    2000
}

impl GptgramConfig {
    /// Load config from a TOML file with GPTGRAM_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.gptgram/gptgram.toml
    ///
    /// Env overrides use `__` as the section separator, e.g.
    /// `GPTGRAM_TELEGRAM__BOT_TOKEN` → `telegram.bot_token`.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);
        tracing::debug!(path = %path, "loading configuration");

        let config: GptgramConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("GPTGRAM_").split("__"))
            .extract()
            .map_err(|e| crate::error::GptgramError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Names of required values that are absent, paired with the env var
    /// that supplies each. Empty when the config is complete.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.telegram.bot_token.trim().is_empty() {
            missing.push("telegram.bot_token (GPTGRAM_TELEGRAM__BOT_TOKEN)");
        }
        if self.model.api_key.trim().is_empty() {
            missing.push("model.api_key (GPTGRAM_MODEL__API_KEY)");
        }
        if self.model.folder_id.trim().is_empty() {
            missing.push("model.folder_id (GPTGRAM_MODEL__FOLDER_ID)");
        }
        missing
    }

    /// Startup validation: required values present, temperature in range.
    pub fn validate(&self) -> crate::error::Result<()> {
        let missing = self.missing_required();
        if !missing.is_empty() {
            let mut msg = String::from("missing required configuration:");
            for item in &missing {
                msg.push_str("\n  - ");
                msg.push_str(item);
            }
            return Err(crate::error::GptgramError::Config(msg));
        }
        if !(0.0..=1.0).contains(&self.model.temperature) {
            return Err(crate::error::GptgramError::Config(format!(
                "model.temperature must be within [0.0, 1.0], got {}",
                self.model.temperature
            )));
        }
        Ok(())
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.gptgram/gptgram.toml", home)
}
