//! Shared error types for the dispatch system

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SharedError {
    #[error("Unknown language code: {value}")]
    UnknownLanguage { value: String },

    #[error("Unknown difficulty level: {value}")]
    UnknownDifficulty { value: String },

    #[error("Missing subscriber preference: {field}")]
    MissingPreference { field: &'static str },

    #[error("Subscriber has no recipient id")]
    MissingRecipient,
}

pub type SharedResult<T> = Result<T, SharedError>;
