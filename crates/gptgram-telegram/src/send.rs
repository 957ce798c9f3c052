//! Outbound message helpers for the Telegram adapter.
//!
//! Telegram caps a message at 4096 characters; replies are split into
//! chunks below that with headroom for MarkdownV2 escaping. A split that
//! falls inside a fenced code block closes the fence at the chunk boundary
//! and reopens it (with its language tag) in the next chunk.

use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::warn;

/// Chunk ceiling, kept under Telegram's 4096 limit to leave room for
/// escape backslashes.
const MESSAGE_LIMIT: usize = 4000;

/// Split `text` into chunks that fit in one Telegram message each,
/// keeping fenced code blocks well-formed across chunk boundaries.
pub fn split_message(text: &str) -> Vec<String> {
    if text.len() <= MESSAGE_LIMIT {
        return vec![text.to_string()];
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut open_fence: Option<String> = None;

    for line in text.split('\n') {
        let extra = line.len() + if current.is_empty() { 0 } else { 1 };
        if !current.is_empty() && current.len() + extra > MESSAGE_LIMIT {
            if open_fence.is_some() {
                current.push_str("\n```");
            }
            chunks.push(std::mem::take(&mut current));
            if let Some(lang) = &open_fence {
                current.push_str("```");
                current.push_str(lang);
                current.push('\n');
            }
        }

        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);

        if let Some(after) = line.trim_start().strip_prefix("```") {
            open_fence = match open_fence {
                Some(_) => None,
                None => Some(after.trim().to_string()),
            };
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks.into_iter().flat_map(hard_split).collect()
}

/// Force-split a chunk that a single overlong line pushed past the limit.
fn hard_split(chunk: String) -> Vec<String> {
    if chunk.len() <= MESSAGE_LIMIT {
        return vec![chunk];
    }

    let mut out = Vec::new();
    let mut rest = chunk.as_str();
    while rest.len() > MESSAGE_LIMIT {
        let cut = match rest[..MESSAGE_LIMIT].rfind(char::is_whitespace) {
            Some(i) if i > 0 => i,
            _ => {
                // no break point: cut at the limit, backing off to a char boundary
                let mut cut = MESSAGE_LIMIT;
                while !rest.is_char_boundary(cut) {
                    cut -= 1;
                }
                cut
            }
        };
        out.push(rest[..cut].to_string());
        rest = rest[cut..].trim_start();
    }
    if !rest.is_empty() {
        out.push(rest.to_string());
    }
    out
}

/// Escape the characters MarkdownV2 treats as markup.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        if matches!(
            ch,
            '_' | '*'
                | '['
                | ']'
                | '('
                | ')'
                | '~'
                | '`'
                | '>'
                | '#'
                | '+'
                | '-'
                | '='
                | '|'
                | '{'
                | '}'
                | '.'
                | '!'
        ) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Send `text` to `chat_id`, chunked.
///
/// Each chunk is tried as MarkdownV2 first; when Telegram rejects the
/// entity parse the chunk is resent as plain text. A short delay between
/// chunks stays clear of per-chat rate limits.
pub async fn send_reply(bot: &Bot, chat_id: ChatId, text: &str) {
    let chunks = split_message(text);
    let last = chunks.len().saturating_sub(1);

    for (i, chunk) in chunks.iter().enumerate() {
        let escaped = escape_markdown_v2(chunk);
        let markdown = bot
            .send_message(chat_id, &escaped)
            .parse_mode(ParseMode::MarkdownV2)
            .await;

        if markdown.is_err() {
            if let Err(e) = bot.send_message(chat_id, chunk).await {
                warn!(error = %e, chunk = i, "telegram: failed to send reply chunk");
            }
        }

        if i < last {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}
