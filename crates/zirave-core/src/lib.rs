//! ZİRAVE Core - plant disease diagnosis over Google Gemini.
//!
//! A thin adapter between an application and the Gemini API: it builds
//! agricultural prompts, sends them (as text or text+image) to a hosted
//! model, and normalizes the free-form reply into a flat JSON record.
//!
//! # Architecture
//!
//! ```text
//! request → prompt template → Gemini → JSON parse ─┬─ ok  → reply + metadata
//!                                                   └─ err → fallback record
//! remote/decode failure ────────────────────────────────── → error record
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use zirave_core::{Config, DiagnosisService};
//!
//! #[tokio::main]
//! async fn main() -> zirave_core::Result<()> {
//!     let config = Config::load()?;
//!     let service = DiagnosisService::new(&config)?;
//!
//!     let symptoms = vec!["yellow leaves".to_string()];
//!     let resp = service.analyze_symptoms("tomato", &symptoms, None, None).await;
//!     if let Some(err) = resp.error() {
//!         eprintln!("analysis failed: {err}");
//!     }
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod decode;
pub mod error;
pub mod llm;
pub mod prompts;
pub mod response;
pub mod service;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, Result, ServiceError, ServiceResult, ZiraveError};
pub use llm::{LlmProvider, ModelHandle};
pub use prompts::{FallbackText, PromptCatalog};
pub use response::Response;
pub use service::DiagnosisService;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
