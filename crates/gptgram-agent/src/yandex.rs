//! YandexGPT foundation-models REST client.
//!
//! `POST {base_url}/foundationModels/v1/completion` with `Api-Key`
//! authorization and an `x-folder-id` routing header.

use serde::Deserialize;
use tracing::{debug, warn};

use gptgram_core::types::Role;

use crate::provider::{
    CompletionProvider, CompletionRequest, CompletionResponse, ProviderError, Usage,
};

pub struct YandexGptProvider {
    client: reqwest::Client,
    api_key: String,
    folder_id: String,
    base_url: String,
}

impl YandexGptProvider {
    pub fn new(api_key: String, folder_id: String, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            folder_id,
            base_url: base_url.unwrap_or_else(|| "https://llm.api.cloud.yandex.net".to_string()),
        }
    }
}

#[async_trait::async_trait]
impl CompletionProvider for YandexGptProvider {
    fn name(&self) -> &str {
        "yandexgpt"
    }

    async fn complete(&self, req: &CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let body = build_request_body(req);
        let url = format!("{}/foundationModels/v1/completion", self.base_url);

        debug!(model_uri = %req.model_uri, turns = req.turns.len(), "sending request to YandexGPT");

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Api-Key {}", self.api_key))
            .header("x-folder-id", &self.folder_id)
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status == 429 {
            let retry = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|s| s * 1000) // convert seconds to ms
                .unwrap_or(5000);
            return Err(ProviderError::RateLimited {
                retry_after_ms: retry,
            });
        }

        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "YandexGPT API error");
            return Err(ProviderError::Api {
                status,
                message: text,
            });
        }

        let api_resp: ApiResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        parse_response(api_resp)
    }
}

fn build_request_body(req: &CompletionRequest) -> serde_json::Value {
    // Turn serializes as {role, text}, which is the YandexGPT message shape.
    serde_json::json!({
        "modelUri": req.model_uri,
        "completionOptions": {
            "stream": false,
            "temperature": req.temperature,
            "maxTokens": req.max_tokens,
        },
        "messages": req.turns,
    })
}

fn parse_response(resp: ApiResponse) -> Result<CompletionResponse, ProviderError> {
    let result = resp.result;
    let alternative = result
        .alternatives
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Parse("no alternatives in response".to_string()))?;

    Ok(CompletionResponse {
        text: alternative.message.text,
        role: alternative.message.role,
        status: alternative.status,
        usage: result.usage.map(|u| Usage {
            input_text_tokens: u.input_text_tokens.0,
            completion_tokens: u.completion_tokens.0,
            total_tokens: u.total_tokens.0,
        }),
        model_version: result.model_version,
    })
}

// YandexGPT API response types (private, deserialization only)

#[derive(Deserialize)]
struct ApiResponse {
    result: ApiResult,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResult {
    alternatives: Vec<Alternative>,
    usage: Option<ApiUsage>,
    #[serde(default)]
    model_version: String,
}

#[derive(Deserialize)]
struct Alternative {
    message: ApiMessage,
    #[serde(default)]
    status: String,
}

#[derive(Deserialize)]
struct ApiMessage {
    role: Role,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsage {
    input_text_tokens: Count,
    completion_tokens: Count,
    total_tokens: Count,
}

/// Token counter. The API renders int64 counters as JSON strings
/// (protobuf JSON mapping), but plain numbers must parse too.
struct Count(u64);

impl<'de> Deserialize<'de> for Count {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u64),
            Str(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(Count(n)),
            Raw::Str(s) => s
                .parse::<u64>()
                .map(Count)
                .map_err(|e| serde::de::Error::custom(format!("bad token count {s:?}: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gptgram_core::types::Turn;

    #[test]
    fn request_body_matches_wire_shape() {
        let req = CompletionRequest {
            model_uri: "gpt://folder/yandexgpt-lite/latest".to_string(),
            turns: vec![Turn::system("be terse"), Turn::user("hi")],
            temperature: 0.5,
            max_tokens: 2000,
        };
        let body = build_request_body(&req);
        assert_eq!(body["modelUri"], "gpt://folder/yandexgpt-lite/latest");
        assert_eq!(body["completionOptions"]["stream"], false);
        assert_eq!(body["completionOptions"]["temperature"], 0.5);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["text"], "hi");
    }

    #[test]
    fn parses_response_with_string_token_counts() {
        let json = r#"{
            "result": {
                "alternatives": [{
                    "message": {"role": "assistant", "text": "Hello!"},
                    "status": "ALTERNATIVE_STATUS_FINAL"
                }],
                "usage": {
                    "inputTextTokens": "19",
                    "completionTokens": "6",
                    "totalTokens": "25"
                },
                "modelVersion": "07.03.2024"
            }
        }"#;
        let resp: ApiResponse = serde_json::from_str(json).unwrap();
        let parsed = parse_response(resp).unwrap();
        assert_eq!(parsed.text, "Hello!");
        assert_eq!(parsed.role, Role::Assistant);
        assert_eq!(parsed.status, "ALTERNATIVE_STATUS_FINAL");
        let usage = parsed.usage.unwrap();
        assert_eq!(usage.input_text_tokens, 19);
        assert_eq!(usage.completion_tokens, 6);
        assert_eq!(usage.total_tokens, 25);
        assert_eq!(parsed.model_version, "07.03.2024");
    }

    #[test]
    fn parses_numeric_token_counts() {
        let json = r#"{
            "result": {
                "alternatives": [{"message": {"role": "assistant", "text": "ok"}}],
                "usage": {"inputTextTokens": 3, "completionTokens": 1, "totalTokens": 4},
                "modelVersion": "test"
            }
        }"#;
        let resp: ApiResponse = serde_json::from_str(json).unwrap();
        let parsed = parse_response(resp).unwrap();
        assert_eq!(parsed.usage.unwrap().total_tokens, 4);
    }

    #[test]
    fn missing_usage_is_tolerated() {
        let json = r#"{
            "result": {
                "alternatives": [{"message": {"role": "assistant", "text": "ok"}}],
                "modelVersion": "test"
            }
        }"#;
        let resp: ApiResponse = serde_json::from_str(json).unwrap();
        let parsed = parse_response(resp).unwrap();
        assert!(parsed.usage.is_none());
    }

    #[test]
    fn empty_alternatives_is_a_parse_error() {
        let json = r#"{"result": {"alternatives": [], "modelVersion": "test"}}"#;
        let resp: ApiResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            parse_response(resp),
            Err(ProviderError::Parse(_))
        ));
    }
}
