//! Gemini provider using the `generateContent` endpoint.
//!
//! Sends the prompt as a text part and, for vision calls, the image as a
//! base64 `inline_data` part in the same user turn.

use super::provider::{LlmProvider, LlmRequest, LlmResponse};
use crate::error::{ConfigError, ServiceError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Per-service connection to the Generative Language API.
///
/// Holds the HTTP client, credential and base URL. Cloning is cheap and
/// every clone shares the same connection pool.
#[derive(Clone)]
pub struct GeminiSession {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl GeminiSession {
    pub fn new(api_key: &str, endpoint: &str) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self {
            api_key: api_key.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.endpoint, model)
    }
}

impl std::fmt::Debug for GeminiSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiSession")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// Gemini provider bound to one model.
pub struct GeminiProvider {
    session: GeminiSession,
    model: String,
}

impl GeminiProvider {
    pub fn new(session: GeminiSession, model: &str) -> Self {
        Self {
            session,
            model: model.to_string(),
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

// --- Response types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u32>,
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, ServiceError> {
        let start = Instant::now();

        let mut parts = vec![Part::Text {
            text: request.prompt.clone(),
        }];
        if let Some(image) = &request.image {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.media_type.clone(),
                    data: image.data.clone(),
                },
            });
        }
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
        };

        let resp = self
            .session
            .client
            .post(self.session.generate_url(&self.model))
            .header("x-goog-api-key", &self.session.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Llm {
                message: format!("Gemini request failed: {e}"),
                status_code: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Llm {
                message: format!("Gemini HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        let gen_resp: GenerateResponse = resp.json().await.map_err(|e| ServiceError::Llm {
            message: format!("Failed to parse Gemini response: {e}"),
            status_code: None,
        })?;

        let text = gen_resp
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ServiceError::Llm {
                message: "Gemini returned empty response: no text content generated"
                    .to_string(),
                status_code: None,
            });
        }

        Ok(LlmResponse {
            text,
            model: gen_resp.model_version.unwrap_or_else(|| self.model.clone()),
            tokens_used: gen_resp.usage_metadata.and_then(|u| u.total_token_count),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::ImageInput;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

    fn provider(server: &MockServer) -> GeminiProvider {
        let session = GeminiSession::new("test-key", &server.uri()).unwrap();
        GeminiProvider::new(session, "gemini-1.5-flash")
    }

    fn reply(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}],
            "usageMetadata": {"totalTokenCount": 57},
            "modelVersion": "gemini-1.5-flash-002"
        })
    }

    #[tokio::test]
    async fn test_generate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("hi there")))
            .expect(1)
            .mount(&server)
            .await;

        let resp = provider(&server)
            .generate(&LlmRequest::text("hello"))
            .await
            .unwrap();
        assert_eq!(resp.text, "hi there");
        assert_eq!(resp.model, "gemini-1.5-flash-002");
        assert_eq!(resp.tokens_used, Some(57));
    }

    #[tokio::test]
    async fn test_generate_with_inline_image() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"parts": [
                    {"text": "look"},
                    {"inline_data": {"mime_type": "image/png", "data": "AQID"}}
                ]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("a leaf")))
            .expect(1)
            .mount(&server)
            .await;

        let image = ImageInput::from_bytes(&[1, 2, 3], "png");
        let resp = provider(&server)
            .generate(&LlmRequest::with_image("look", image))
            .await
            .unwrap();
        assert_eq!(resp.text, "a leaf");
    }

    #[tokio::test]
    async fn test_generate_joins_multiple_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}}]
            })))
            .mount(&server)
            .await;

        let resp = provider(&server)
            .generate(&LlmRequest::text("x"))
            .await
            .unwrap();
        assert_eq!(resp.text, "{\"a\":1}");
        assert_eq!(resp.model, "gemini-1.5-flash");
        assert_eq!(resp.tokens_used, None);
    }

    #[tokio::test]
    async fn test_http_error_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate(&LlmRequest::text("x"))
            .await
            .unwrap_err();
        match err {
            ServiceError::Llm {
                message,
                status_code,
            } => {
                assert_eq!(status_code, Some(403));
                assert!(message.contains("API key not valid"));
            }
            other => panic!("expected Llm error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_candidates_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate(&LlmRequest::text("x"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty response"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate(&LlmRequest::text("x"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to parse Gemini response"));
    }

    #[test]
    fn test_session_trims_trailing_slash() {
        let session = GeminiSession::new("k", "http://localhost:1234/").unwrap();
        assert_eq!(
            session.generate_url("m"),
            "http://localhost:1234/v1beta/models/m:generateContent"
        );
    }

    #[test]
    fn test_session_debug_hides_key() {
        let session = GeminiSession::new("secret-key", "http://localhost").unwrap();
        assert!(!format!("{session:?}").contains("secret-key"));
    }
}
