use thiserror::Error;

#[derive(Debug, Error)]
pub enum GptgramError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Completion provider error: {0}")]
    Provider(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GptgramError>;
