//! Channel-agnostic message pipeline.
//!
//! The transport adapter hands every inbound message to `handle_command`
//! first; when that returns `None` the message is conversation content and
//! goes through `process_content_message`.

pub mod command;
pub mod context;
pub mod format;
pub mod process;

pub use command::{handle_command, parse_command, Command, CommandError};
pub use context::MessageContext;
pub use format::render_reply;
pub use process::process_content_message;
