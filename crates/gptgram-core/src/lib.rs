pub mod config;
pub mod error;
pub mod types;

pub use error::{GptgramError, Result};
pub use types::{Role, Turn, UserId};
