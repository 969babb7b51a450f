//! Plant diagnosis service over Gemini.
//!
//! Each operation builds a prompt, makes exactly one model call and
//! normalizes the reply into a [`Response`]. Only construction can fail with
//! a `Result`; everything after that is folded into the returned record.

use std::sync::Arc;

use crate::config::{Config, API_KEY_ENV};
use crate::decode::{format_to_string, prepare_image};
use crate::error::{ConfigError, ServiceError, ServiceResult};
use crate::llm::{GeminiProvider, GeminiSession, ImageInput, LlmRequest, ModelHandle};
use crate::prompts::{non_empty, FallbackText, Prompts};
use crate::response::{parse_structured, timestamp_now, ParsedReply, Response, RAW_RESPONSE_KEY};

/// Gemini-backed plant diagnosis and advice.
///
/// Holds a text handle and a vision handle; both are read-only after
/// construction, so one service can serve concurrent calls.
pub struct DiagnosisService {
    api_key: String,
    text_model: ModelHandle,
    vision_model: ModelHandle,
    prompts: Prompts,
    text: FallbackText,
}

impl DiagnosisService {
    /// Build a service from configuration.
    ///
    /// Fails with [`ConfigError::MissingCredential`] when no API key can be
    /// resolved.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let api_key = config.api_key()?;
        let session = GeminiSession::new(&api_key, &config.gemini.endpoint)?;

        let text_model = ModelHandle::new(
            Arc::new(GeminiProvider::new(session.clone(), &config.gemini.text_model)),
            config.gemini.text_model.clone(),
        );
        let vision_model = ModelHandle::new(
            Arc::new(GeminiProvider::new(session, &config.gemini.vision_model)),
            config.gemini.vision_label.clone(),
        );

        let prompts = Prompts::new(&config.prompts, &config.fallback)?;
        tracing::debug!(
            endpoint = %config.gemini.endpoint,
            text_model = %config.gemini.text_model,
            vision_model = %config.gemini.vision_model,
            "Diagnosis service initialized"
        );

        Ok(Self {
            api_key,
            text_model,
            vision_model,
            prompts,
            text: config.fallback.clone(),
        })
    }

    /// Build a service with default settings and the key from `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let key = std::env::var(API_KEY_ENV).unwrap_or_default();
        if key.is_empty() {
            return Err(ConfigError::MissingCredential {
                var: API_KEY_ENV.to_string(),
            });
        }
        let mut config = Config::default();
        config.gemini.api_key = key;
        Self::new(&config)
    }

    /// Build a service around pre-built model handles.
    ///
    /// The credential is stored as given and only consulted by
    /// [`is_available`](Self::is_available).
    pub fn with_models(
        api_key: impl Into<String>,
        text_model: ModelHandle,
        vision_model: ModelHandle,
        config: &Config,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: api_key.into(),
            text_model,
            vision_model,
            prompts: Prompts::new(&config.prompts, &config.fallback)?,
            text: config.fallback.clone(),
        })
    }

    /// Whether a credential is configured. Does not touch the network.
    pub fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Diagnose a plant from a list of observed symptoms.
    pub async fn analyze_symptoms(
        &self,
        plant_type: &str,
        symptoms: &[String],
        location: Option<&str>,
        season: Option<&str>,
    ) -> Response {
        match self
            .try_analyze_symptoms(plant_type, symptoms, location, season)
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(plant_type, "Symptom analysis failed: {e}");
                let mut resp = Response::new();
                resp.insert("error", format!("Gemini analysis failed: {e}"))
                    .insert("diagnosis", self.text.diagnosis_unavailable.as_str())
                    .insert("confidence", 0)
                    .insert("timestamp", timestamp_now());
                resp
            }
        }
    }

    async fn try_analyze_symptoms(
        &self,
        plant_type: &str,
        symptoms: &[String],
        location: Option<&str>,
        season: Option<&str>,
    ) -> ServiceResult<Response> {
        let prompt = self
            .prompts
            .symptoms(plant_type, symptoms, location, season)?;
        let reply = self.text_model.generate(&LlmRequest::text(prompt)).await?;
        tracing::info!(
            model = %reply.model,
            latency_ms = reply.latency_ms,
            tokens = ?reply.tokens_used,
            "Symptom analysis reply received"
        );

        let mut resp = match parse_structured(&reply.text) {
            ParsedReply::Object(resp) => resp,
            ParsedReply::NotJson => {
                tracing::warn!("Symptom analysis reply is not JSON, using fallback record");
                self.symptoms_fallback(&reply.text)
            }
            ParsedReply::NotAnObject(kind) => return Err(ServiceError::NonObjectReply { kind }),
        };
        resp.insert("timestamp", timestamp_now())
            .insert("model", self.text_model.label());
        Ok(resp)
    }

    fn symptoms_fallback(&self, raw: &str) -> Response {
        let t = &self.text;
        let mut resp = Response::new();
        resp.insert("diagnosis", t.symptoms_diagnosis.as_str())
            .insert("confidence", 75)
            .insert("causes", vec![t.symptoms_cause.clone()])
            .insert("treatment_plan", raw)
            .insert("prevention", t.keep_monitoring.as_str())
            .insert("expert_consultation", t.consult_if_persists.as_str())
            .insert("severity", "medium")
            .insert("immediate_actions", vec![t.monitor_plant.clone()])
            .insert(RAW_RESPONSE_KEY, raw);
        resp
    }

    /// Diagnose a plant from a photo.
    pub async fn analyze_image(&self, image_bytes: &[u8], plant_type: Option<&str>) -> Response {
        let plant_type = non_empty(plant_type);
        match self.try_analyze_image(image_bytes, plant_type).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(bytes = image_bytes.len(), "Image analysis failed: {e}");
                let mut resp = Response::new();
                resp.insert("error", format!("Gemini vision analysis failed: {e}"))
                    .insert("plant_type", plant_type.unwrap_or(self.text.unspecified.as_str()))
                    .insert("health_status", self.text.image_status_unavailable.as_str())
                    .insert("confidence", 0)
                    .insert("timestamp", timestamp_now());
                resp
            }
        }
    }

    async fn try_analyze_image(
        &self,
        image_bytes: &[u8],
        plant_type: Option<&str>,
    ) -> ServiceResult<Response> {
        let prepared = prepare_image(image_bytes.to_vec()).await?;
        tracing::debug!(
            format = %format_to_string(prepared.decoded.format),
            width = prepared.decoded.width,
            height = prepared.decoded.height,
            upload = %format_to_string(prepared.upload_format),
            "Decoded plant image"
        );
        let image = ImageInput::from_bytes(
            &prepared.bytes,
            &format_to_string(prepared.upload_format),
        );

        let prompt = self.prompts.image(plant_type)?;
        let reply = self
            .vision_model
            .generate(&LlmRequest::with_image(prompt, image))
            .await?;
        tracing::info!(
            model = %reply.model,
            latency_ms = reply.latency_ms,
            tokens = ?reply.tokens_used,
            "Image analysis reply received"
        );

        let mut resp = match parse_structured(&reply.text) {
            ParsedReply::Object(resp) => resp,
            ParsedReply::NotJson => {
                tracing::warn!("Image analysis reply is not JSON, using fallback record");
                self.image_fallback(&reply.text, plant_type)
            }
            ParsedReply::NotAnObject(kind) => return Err(ServiceError::NonObjectReply { kind }),
        };
        resp.insert("timestamp", timestamp_now())
            .insert("model", self.vision_model.label())
            .insert("image_analyzed", true);
        Ok(resp)
    }

    fn image_fallback(&self, raw: &str, plant_type: Option<&str>) -> Response {
        let t = &self.text;
        let mut resp = Response::new();
        resp.insert("plant_type", plant_type.unwrap_or(t.unspecified.as_str()))
            .insert("health_status", t.image_status_pending.as_str())
            .insert("diseases", vec![t.image_disease_pending.clone()])
            .insert("severity", "medium")
            .insert("confidence", 70)
            .insert("immediate_recommendations", vec![t.monitor_plant.clone()])
            .insert("treatment_plan", raw)
            .insert("prevention_tips", t.keep_monitoring.as_str())
            .insert("visual_analysis", t.visual_analysis.as_str())
            .insert(RAW_RESPONSE_KEY, raw);
        resp
    }

    /// Answer a free-form farming question.
    pub async fn get_agricultural_advice(&self, question: &str, context: Option<&str>) -> Response {
        match self.try_advice(question, context).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!("Agricultural advice failed: {e}");
                let mut resp = Response::new();
                resp.insert("error", format!("Gemini advice failed: {e}"))
                    .insert("question", question)
                    .insert("answer", self.text.advice_apology.as_str())
                    .insert("timestamp", timestamp_now());
                resp
            }
        }
    }

    async fn try_advice(&self, question: &str, context: Option<&str>) -> ServiceResult<Response> {
        let prompt = self.prompts.advice(question, context)?;
        let reply = self.text_model.generate(&LlmRequest::text(prompt)).await?;
        tracing::info!(
            model = %reply.model,
            latency_ms = reply.latency_ms,
            tokens = ?reply.tokens_used,
            "Advice reply received"
        );

        let mut resp = Response::new();
        resp.insert("question", question)
            .insert("answer", reply.text)
            .insert("timestamp", timestamp_now())
            .insert("model", self.text_model.label());
        Ok(resp)
    }
}
