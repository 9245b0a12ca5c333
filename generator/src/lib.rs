//! Content generation for the daily dispatch
//!
//! Turns a (language, difficulty) key into learning content through an LLM
//! provider, and memoizes the result per run so every key is generated once.

pub mod core;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;

// Re-export main types
pub use crate::core::{GenerationCache, LlmContentGenerator, PromptPair, SharedContent};
pub use error::{GenerationError, GenerationResult};
pub use services::*;
pub use traits::*;
pub use types::*;
