//! Error types for the ZİRAVE diagnosis service.
//!
//! Only [`ConfigError`] ever reaches a caller as a `Result::Err`. Failures
//! inside an operation are [`ServiceError`]s, which the service converts into
//! error records instead of propagating.

use thiserror::Error;

/// Top-level error type for ZİRAVE operations.
#[derive(Error, Debug)]
pub enum ZiraveError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors raised while serving a request
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The API credential is absent or empty
    #[error("{var} environment variable is required")]
    MissingCredential { var: String },

    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A prompt template does not compile
    #[error("Invalid prompt template '{name}': {message}")]
    Template { name: String, message: String },

    /// The HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Failures while serving a single request.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Image bytes could not be decoded
    #[error("Image decode failed: {message}")]
    Decode { message: String },

    /// Image format could not be determined
    #[error("Unsupported image format")]
    UnsupportedFormat,

    /// A decoded image could not be re-encoded for upload
    #[error("Image encode failed: {message}")]
    Encode { message: String },

    /// Prompt rendering failed
    #[error("Prompt render failed for '{template}': {message}")]
    Prompt { template: String, message: String },

    /// The reply is valid JSON but not an object, so it cannot become a record
    #[error("Reply is JSON {kind}, expected an object")]
    NonObjectReply { kind: &'static str },

    /// Remote model call failed
    #[error("{message}")]
    Llm {
        message: String,
        status_code: Option<u16>,
    },
}

/// Convenience type alias for ZİRAVE results.
pub type Result<T> = std::result::Result<T, ZiraveError>;

/// Convenience type alias for request-level results.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
