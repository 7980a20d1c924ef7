//! Gemini provider
//!
//! Gemini has no system role on `generateContent` contents, so system
//! instructions are sent as a labelled user turn.

use serde::{Deserialize, Serialize};

use super::{ProviderConfig, error_message, http_client};
use crate::infrastructure::llm::{Context, Error, MessageRole, Response, TokenUsage};

/// Gemini API request format
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

/// Gemini content (message)
#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

/// Gemini content part
#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

/// Generation configuration
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

/// Gemini API response format
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

/// Gemini usage metadata
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

/// Execute a chat request using Gemini's API
pub async fn chat(config: ProviderConfig, context: Context) -> Result<Response, Error> {
    let timeout = config.request_timeout();
    let base_url = config
        .base_url
        .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string());

    let model = context.model.unwrap_or_else(|| {
        if config.default_model.is_empty() {
            "gemini-1.5-flash".to_string()
        } else {
            config.default_model.clone()
        }
    });

    let url = format!(
        "{}/v1beta/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    );

    let contents = context
        .messages
        .iter()
        .map(|msg| {
            let (role, text) = match msg.role {
                MessageRole::System => ("user", format!("System: {}", msg.content)),
                MessageRole::User => ("user", msg.content.clone()),
                MessageRole::Assistant => ("model", msg.content.clone()),
            };
            GeminiContent {
                role: role.to_string(),
                parts: vec![GeminiPart { text }],
            }
        })
        .collect();

    let generation_config = if context.temperature.is_some() || context.max_tokens.is_some() {
        Some(GenerationConfig {
            temperature: context.temperature,
            max_output_tokens: context.max_tokens,
        })
    } else {
        None
    };

    let request = GeminiRequest {
        contents,
        generation_config,
    };

    tracing::debug!("POST {} (model {})", url, model);

    let response = http_client()
        .post(&url)
        .query(&[("key", config.api_key.as_str())])
        .timeout(timeout)
        .json(&request)
        .send()
        .await
        .map_err(|e| Error::new("gemini", format!("HTTP request failed: {}", e)))?;

    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        if let Some(message) = error_message(&error_text) {
            return Err(Error::new("gemini", message));
        }
        return Err(Error::new(
            "gemini",
            format!("HTTP {}: {}", status, error_text),
        ));
    }

    let gemini_response: GeminiResponse = response
        .json()
        .await
        .map_err(|e| Error::new("gemini", format!("Failed to parse response: {}", e)))?;

    let candidate = gemini_response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::new("gemini", "No candidates in response"))?;

    let content = candidate
        .content
        .parts
        .into_iter()
        .map(|part| part.text)
        .collect::<Vec<_>>()
        .join("\n");

    let usage = gemini_response
        .usage_metadata
        .map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        })
        .unwrap_or_default();

    Ok(Response {
        content,
        model,
        usage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> ProviderConfig {
        ProviderConfig {
            api_key: "gem-key".into(),
            base_url: Some(base_url.to_string()),
            default_model: "gemini-test".into(),
            timeout: Some(5),
            max_tokens: None,
        }
    }

    #[tokio::test]
    async fn test_generate_content() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-test:generateContent"))
            .and(query_param("key", "gem-key"))
            .and(body_partial_json(json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "System: be terse"}]},
                    {"role": "user", "parts": [{"text": "hi"}]}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": "line one"}, {"text": "line two"}]}, "finishReason": "STOP"}],
                "usageMetadata": {"promptTokenCount": 5, "candidatesTokenCount": 6, "totalTokenCount": 11}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let context = Context::new()
            .add_system_message("be terse")
            .add_user_message("hi");
        let response = chat(config(&mock_server.uri()), context).await.unwrap();

        assert_eq!(response.content, "line one\nline two");
        assert_eq!(response.model, "gemini-test");
        assert_eq!(response.usage.total_tokens, 11);
    }

    #[tokio::test]
    async fn test_generate_content_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-test:generateContent"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "API key not valid"}
            })))
            .mount(&mock_server)
            .await;

        let context = Context::new().add_user_message("hi");
        let err = chat(config(&mock_server.uri()), context).await.unwrap_err();
        assert_eq!(err.to_string(), "[gemini] API key not valid");
    }
}
