//! LLM integration.
//!
//! A provider abstraction with a single Gemini backend, and the named model
//! handles the diagnosis service holds.

pub(crate) mod gemini;
pub(crate) mod provider;

pub use gemini::{GeminiProvider, GeminiSession};
pub use provider::{ImageInput, LlmProvider, LlmRequest, LlmResponse, ModelHandle};
