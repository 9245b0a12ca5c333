//! Generator core business logic

pub mod cache;
pub mod generator;
pub mod prompt;

pub use cache::{panic_message, GenerationCache, SharedContent};
pub use generator::LlmContentGenerator;
pub use prompt::{PromptPair, LanguageTemplate};
