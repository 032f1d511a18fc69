//! Gemini client for answer generation via the Generative Language API
//!
//! Authenticates with an API key (`x-goog-api-key`). Requests carry a single
//! user turn; the response text is returned exactly as the model produced it.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::providers::llm::LlmProvider;
use crate::types::{GenerationRequest, GenerationResponse};

/// Gemini client
pub struct GeminiClient {
    client: Client,
    config: LlmConfig,
}

impl GeminiClient {
    /// Create a new Gemini client. A missing API key is not an error here;
    /// it is reported on first use.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Get the API endpoint URL
    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                Error::authentication(
                    "no Gemini API key configured (set GEMINI_API_KEY or GOOGLE_API_KEY)",
                )
            })
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(serde::Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(serde::Serialize)]
struct Part {
    text: String,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(serde::Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(serde::Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(serde::Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(serde::Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    status: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, all parts joined
    fn into_text(self) -> Result<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(Error::llm(format!("Gemini blocked the prompt: {}", reason)));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::llm("No candidates in Gemini response"))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(Error::llm(format!(
                "No text in Gemini response (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }
        Ok(text)
    }
}

/// Map a non-success API response to the matching error kind
fn classify_failure(status: StatusCode, body: &str, prompt_chars: usize, limit: usize) -> Error {
    let (message, api_status) = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => (parsed.error.message, parsed.error.status.unwrap_or_default()),
        Err(_) => (body.to_string(), String::new()),
    };
    let lower = message.to_lowercase();

    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || api_status == "UNAUTHENTICATED"
        || api_status == "PERMISSION_DENIED"
        || lower.contains("api key not valid")
        || lower.contains("api_key_invalid")
    {
        return Error::authentication(format!("Gemini rejected the credential ({}): {}", status, message));
    }

    let input_too_large = status == StatusCode::PAYLOAD_TOO_LARGE
        || (status == StatusCode::BAD_REQUEST
            && (lower.contains("token") || lower.contains("too large") || lower.contains("too long"))
            && (lower.contains("exceed") || lower.contains("limit") || lower.contains("too ")));
    if input_too_large {
        tracing::warn!("Gemini refused prompt as too large: {}", message);
        return Error::PromptTooLarge {
            size: prompt_chars,
            limit,
        };
    }

    Error::llm(format!("Gemini generation failed ({}): {}", status, message))
}

#[async_trait]
impl LlmProvider for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        let api_key = self.api_key()?;
        let prompt = PromptBuilder::build(request);
        PromptBuilder::ensure_within_limit(&prompt, self.config.max_prompt_chars)?;
        let prompt_chars = prompt.chars().count();

        let generation_config =
            if self.config.temperature.is_some() || self.config.max_output_tokens.is_some() {
                Some(GenerationConfig {
                    temperature: self.config.temperature,
                    max_output_tokens: self.config.max_output_tokens,
                })
            } else {
                None
            };

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part { text: prompt }],
            }],
            generation_config,
        };

        tracing::debug!(
            "Sending {} char prompt to {} (context: {})",
            prompt_chars,
            self.config.model,
            request.has_context()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Llm(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(
                status,
                &body,
                prompt_chars,
                self.config.max_prompt_chars,
            ));
        }

        let gen_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Llm(format!("Failed to parse Gemini response: {}", e)))?;

        Ok(GenerationResponse::new(
            gen_response.into_text()?,
            self.config.model.clone(),
        ))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.api_key().is_ok())
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_mock;
    use axum::{
        extract::State,
        http::HeaderMap,
        routing::post,
        Json, Router,
    };
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Captured {
        bodies: Arc<Mutex<Vec<Value>>>,
        keys: Arc<Mutex<Vec<String>>>,
        paths: Arc<Mutex<Vec<String>>>,
    }

    async fn answer_with(reply: Value, status: StatusCode) -> (String, Captured) {
        let captured = Captured::default();
        let router = Router::new()
            .route(
                "/v1beta/models/:model_action",
                post(
                    move |State(c): State<Captured>,
                          axum::extract::Path(action): axum::extract::Path<String>,
                          headers: HeaderMap,
                          Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            c.bodies.lock().push(body);
                            c.paths.lock().push(action);
                            if let Some(key) = headers.get("x-goog-api-key") {
                                c.keys.lock().push(key.to_str().unwrap_or("").to_string());
                            }
                            (status, Json(reply))
                        }
                    },
                ),
            )
            .with_state(captured.clone());

        (spawn_mock(router).await, captured)
    }

    fn config(base_url: &str) -> LlmConfig {
        LlmConfig {
            base_url: base_url.to_string(),
            model: "gemini-test".to_string(),
            api_key: Some("test-key".to_string()),
            ..LlmConfig::default()
        }
    }

    fn ok_reply(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }

    #[tokio::test]
    async fn test_document_prompt_sent_literally() {
        let (url, captured) = answer_with(ok_reply("The total is 42."), StatusCode::OK).await;
        let client = GeminiClient::new(&config(&url)).unwrap();

        let context = "Invoice #7\nTotal: 42 EUR\n{not a template}";
        let question = "What is the total?";
        let response = client
            .generate(&GenerationRequest::with_context(context, question))
            .await
            .unwrap();

        assert_eq!(response.text, "The total is 42.");
        assert_eq!(response.model, "gemini-test");

        let bodies = captured.bodies.lock();
        let sent = bodies[0]["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(sent.contains(context));
        assert!(sent.contains(question));
        assert_eq!(bodies[0]["contents"][0]["role"], "user");
        assert!(bodies[0].get("generationConfig").is_none());
        assert_eq!(captured.keys.lock()[0], "test-key");
        assert_eq!(captured.paths.lock()[0], "gemini-test:generateContent");
    }

    #[tokio::test]
    async fn test_response_parts_joined_unmodified() {
        let reply = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "  Four" }, { "text": ".\n" }] }
            }]
        });
        let (url, _) = answer_with(reply, StatusCode::OK).await;
        let client = GeminiClient::new(&config(&url)).unwrap();

        let response = client.generate(&GenerationRequest::general("2+2?")).await.unwrap();
        assert_eq!(response.text, "  Four.\n");
    }

    #[tokio::test]
    async fn test_missing_key_is_authentication_error() {
        let (url, captured) = answer_with(ok_reply("unused"), StatusCode::OK).await;
        let mut cfg = config(&url);
        cfg.api_key = None;
        let client = GeminiClient::new(&cfg).unwrap();

        let err = client.generate(&GenerationRequest::general("hi")).await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
        assert!(!client.health_check().await.unwrap());
        assert!(captured.bodies.lock().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_key_is_authentication_error() {
        let reply = json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        });
        let (url, _) = answer_with(reply, StatusCode::BAD_REQUEST).await;
        let client = GeminiClient::new(&config(&url)).unwrap();

        let err = client.generate(&GenerationRequest::general("hi")).await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
    }

    #[tokio::test]
    async fn test_oversized_prompt_fails_before_sending() {
        let (url, captured) = answer_with(ok_reply("unused"), StatusCode::OK).await;
        let mut cfg = config(&url);
        cfg.max_prompt_chars = 100;
        let client = GeminiClient::new(&cfg).unwrap();

        let context = "x".repeat(200);
        let err = client
            .generate(&GenerationRequest::with_context(context, "Summarise"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::PromptTooLarge { limit: 100, .. }));
        assert!(captured.bodies.lock().is_empty());
    }

    #[tokio::test]
    async fn test_api_token_limit_maps_to_prompt_too_large() {
        let reply = json!({
            "error": {
                "code": 400,
                "message": "The input token count (1500000) exceeds the maximum number of tokens allowed (1048576).",
                "status": "INVALID_ARGUMENT"
            }
        });
        let (url, _) = answer_with(reply, StatusCode::BAD_REQUEST).await;
        let client = GeminiClient::new(&config(&url)).unwrap();

        let err = client
            .generate(&GenerationRequest::with_context("doc", "q"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PromptTooLarge { .. }));
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_llm_error() {
        let reply = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let (url, _) = answer_with(reply, StatusCode::OK).await;
        let client = GeminiClient::new(&config(&url)).unwrap();

        let err = client.generate(&GenerationRequest::general("hi")).await.unwrap_err();
        match err {
            Error::Llm(msg) => assert!(msg.contains("SAFETY")),
            other => panic!("expected Llm error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_llm_error() {
        let reply = json!({ "error": { "code": 500, "message": "internal", "status": "INTERNAL" } });
        let (url, _) = answer_with(reply, StatusCode::INTERNAL_SERVER_ERROR).await;
        let client = GeminiClient::new(&config(&url)).unwrap();

        let err = client.generate(&GenerationRequest::general("hi")).await.unwrap_err();
        assert!(matches!(err, Error::Llm(_)));
    }
}
