use std::sync::Arc;

use tracing::info;

mod app;

use app::AppState;
use gptgram_agent::dialog::DialogStore;
use gptgram_agent::runtime::{model_uri, ModelRuntime};
use gptgram_agent::yandex::YandexGptProvider;
use gptgram_core::config::GptgramConfig;
use gptgram_telegram::TelegramAdapter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gptgram=info".into()),
        )
        .init();

    // load config: explicit GPTGRAM_CONFIG path > ~/.gptgram/gptgram.toml
    let config_path = std::env::var("GPTGRAM_CONFIG").ok();
    let config = GptgramConfig::load(config_path.as_deref())?;

    // required values missing at startup are fatal, before any polling
    config.validate()?;

    let provider = YandexGptProvider::new(
        config.model.api_key.clone(),
        config.model.folder_id.clone(),
        Some(config.model.base_url.clone()),
    );
    let uri = model_uri(&config.model.folder_id, &config.model.name);
    info!(model_uri = %uri, "completion provider: YandexGPT");

    let model = ModelRuntime::new(
        Box::new(provider),
        uri,
        config.model.max_tokens,
        config.model.temperature,
    );

    if let Some(max_turns) = config.history.max_turns {
        info!(max_turns, "history window enabled");
    }
    let dialogs = DialogStore::new(config.history.max_turns);

    let state = Arc::new(AppState::new(model, dialogs));

    TelegramAdapter::new(&config.telegram, state).run().await;
    Ok(())
}
