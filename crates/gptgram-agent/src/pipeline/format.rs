//! Response formatter: completion result to user-facing display string.

use crate::provider::CompletionResponse;

/// Render a completion result for the user: the generated text followed by
/// a footer with token usage, alternative status, generated role, and model
/// version. Pure; missing usage renders placeholders instead of failing.
pub fn render_reply(resp: &CompletionResponse) -> String {
    let usage = match &resp.usage {
        Some(u) => format!(
            "{} in, {} out, {} total",
            u.input_text_tokens, u.completion_tokens, u.total_tokens
        ),
        None => "n/a".to_string(),
    };

    format!(
        "{}\n\nTokens: {}\nStatus: {}\nRole: {}\nModel version: {}",
        resp.text.trim_end(),
        usage,
        resp.status,
        resp.role,
        resp.model_version
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Usage;
    use gptgram_core::types::Role;

    fn response(usage: Option<Usage>) -> CompletionResponse {
        CompletionResponse {
            text: "Hello!\n".to_string(),
            role: Role::Assistant,
            status: "ALTERNATIVE_STATUS_FINAL".to_string(),
            usage,
            model_version: "07.03.2024".to_string(),
        }
    }

    #[test]
    fn renders_text_then_usage_then_metadata() {
        let rendered = render_reply(&response(Some(Usage {
            input_text_tokens: 19,
            completion_tokens: 6,
            total_tokens: 25,
        })));

        assert!(rendered.starts_with("Hello!\n\n"));
        let text_pos = rendered.find("Hello!").unwrap();
        let usage_pos = rendered.find("Tokens: 19 in, 6 out, 25 total").unwrap();
        let status_pos = rendered.find("Status: ALTERNATIVE_STATUS_FINAL").unwrap();
        let role_pos = rendered.find("Role: assistant").unwrap();
        let version_pos = rendered.find("Model version: 07.03.2024").unwrap();
        assert!(text_pos < usage_pos);
        assert!(usage_pos < status_pos);
        assert!(status_pos < role_pos);
        assert!(role_pos < version_pos);
    }

    #[test]
    fn missing_usage_does_not_fail() {
        let rendered = render_reply(&response(None));
        assert!(rendered.contains("Tokens: n/a"));
    }
}
