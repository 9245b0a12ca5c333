//! Generator error types

use thiserror::Error;
use shared::{ApiFailure, GenerationKey, ProviderId};

/// Result type for generator operations
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Generation error types. Clone so the generation cache can hand the same
/// recorded failure to every requester of a key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Provider request failed: {provider} - {reason}")]
    ProviderError { provider: ProviderId, reason: ApiFailure },

    #[error("Provider returned empty content for {key}")]
    EmptyResponse { key: GenerationKey },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Generation for {key} aborted: {message}")]
    Aborted { key: GenerationKey, message: String },
}
