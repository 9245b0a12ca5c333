//! Generator trait definitions for dependency injection

use std::sync::Arc;
use async_trait::async_trait;

use shared::{ApiFailure, GenerationKey, ProviderId};
use crate::error::GenerationResult;
use crate::types::Completion;

/// Text-generation provider: one system + user prompt in, one completion out
#[mockall::automock]
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Which provider this client talks to
    fn provider_id(&self) -> ProviderId;

    /// Make a single chat-completion request
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<Completion, ApiFailure>;
}

/// Produces the learning content for one (language, difficulty) key
#[mockall::automock]
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate content for `key`; exactly one provider call, no retry
    async fn generate(&self, key: GenerationKey) -> GenerationResult<String>;
}

#[async_trait]
impl<T> ContentGenerator for Arc<T>
where
    T: ContentGenerator + ?Sized,
{
    async fn generate(&self, key: GenerationKey) -> GenerationResult<String> {
        (**self).generate(key).await
    }
}
