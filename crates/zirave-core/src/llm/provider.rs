//! LLM provider trait and request/response types.
//!
//! Defines the interface the service talks to, plus [`ModelHandle`], the
//! named, shareable reference to one configured model.

use crate::error::ServiceError;
use async_trait::async_trait;
use base64::Engine;
use std::fmt;
use std::sync::Arc;

/// Base64-encoded image ready to send to an LLM API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and format string.
    ///
    /// The format is the image format identifier (e.g., "jpeg", "png", "webp").
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        let media_type = match format {
            "jpeg" | "jpg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            "bmp" => "image/bmp",
            "tiff" => "image/tiff",
            "avif" => "image/avif",
            other => {
                tracing::warn!("Unknown image format '{other}', defaulting to image/jpeg");
                "image/jpeg"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }
}

/// A single generation request: a prompt and, for vision calls, one image.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Text prompt for the model
    pub prompt: String,
    /// Image to analyze alongside the prompt
    pub image: Option<ImageInput>,
}

impl LlmRequest {
    /// Text-only request.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
        }
    }

    /// Prompt plus image.
    pub fn with_image(prompt: impl Into<String>, image: ImageInput) -> Self {
        Self {
            prompt: prompt.into(),
            image: Some(image),
        }
    }
}

/// The response from an LLM call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text, untrimmed
    pub text: String,
    /// Model identifier reported by the provider
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all LLM providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Arc<dyn LlmProvider>` for dynamic dispatch).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging (e.g., "gemini").
    fn name(&self) -> &str;

    /// Generate a reply for the given request. One attempt, no retries.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, ServiceError>;
}

/// A named, cheaply cloneable reference to a configured model.
///
/// The label is what responses report in their `model` field; it need not
/// match the provider's own model identifier.
#[derive(Clone)]
pub struct ModelHandle {
    provider: Arc<dyn LlmProvider>,
    label: String,
}

impl ModelHandle {
    pub fn new(provider: Arc<dyn LlmProvider>, label: impl Into<String>) -> Self {
        Self {
            provider,
            label: label.into(),
        }
    }

    /// Name reported in response metadata.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, ServiceError> {
        tracing::debug!(
            provider = self.provider.name(),
            model = %self.label,
            has_image = request.image.is_some(),
            prompt_chars = request.prompt.chars().count(),
            "Sending generation request"
        );
        self.provider.generate(request).await
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("provider", &self.provider.name())
            .field("label", &self.label)
            .finish()
    }
}
