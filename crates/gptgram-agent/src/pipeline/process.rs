//! Content path: context assembly, completion invocation, transcript
//! update, reply rendering.

use tracing::info;

use gptgram_core::types::{Turn, UserId};

use crate::provider::ProviderError;

use super::context::MessageContext;
use super::format::render_reply;

/// Run one conversation turn for a content message.
///
/// The dialog lock is held across the completion call: two in-flight
/// messages from the same user are processed strictly one after the other,
/// so the second always sees the first's appended assistant turn. Messages
/// from other users run on their own dialogs and are unaffected.
///
/// On endpoint failure the appended user turn stays in the transcript (the
/// next turn simply adds more context) and the error propagates to the
/// adapter, which logs it and replies with a generic apology.
pub async fn process_content_message<C: MessageContext>(
    ctx: &C,
    user: &UserId,
    text: &str,
) -> Result<String, ProviderError> {
    let dialog = ctx.dialogs().dialog(user);
    let mut transcript = dialog.lock().await;

    transcript.push(Turn::user(text));
    let payload = transcript.payload(ctx.dialogs().max_turns());

    let resp = ctx.model().complete(payload).await?;

    // Append before rendering so the next message in this dialog sees it.
    transcript.push(Turn {
        role: resp.role,
        text: resp.text.clone(),
    });

    info!(
        user = %user,
        tokens_in = resp.usage.map(|u| u.input_text_tokens).unwrap_or(0),
        tokens_out = resp.usage.map(|u| u.completion_tokens).unwrap_or(0),
        status = %resp.status,
        "pipeline: completion ok"
    );

    Ok(render_reply(&resp))
}
