//! Coordinator-specific error types

use thiserror::Error;

/// Errors that stop a run from starting. Per-key and per-subscriber failures
/// never surface here; they are recorded in the run report.
#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("Configuration error: {field} - {message}")]
    ConfigurationError { field: String, message: String },

    #[error("Subscriber directory unavailable: {message}")]
    DirectoryError { message: String },
}

impl CoordinatorError {
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoordinatorError::ConfigurationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn directory(message: impl Into<String>) -> Self {
        CoordinatorError::DirectoryError { message: message.into() }
    }
}

pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

/// Failure to deliver one message. Returned to the coordinator, which records
/// it against the subscriber and carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Destination not found: {destination}")]
    DestinationNotFound { destination: String },

    #[error("Messaging provider unreachable: {message}")]
    Unreachable { message: String },

    #[error("Messaging provider rejected the message: {reason}")]
    Rejected { reason: String },
}
