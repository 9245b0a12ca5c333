//! Content generation against a text provider

use async_trait::async_trait;
use tracing::{debug, warn};

use shared::GenerationKey;
use crate::core::prompt::PromptPair;
use crate::error::{GenerationError, GenerationResult};
use crate::traits::{ContentGenerator, TextProvider};

/// Generates learning content by sending the templated prompts to an LLM
pub struct LlmContentGenerator<P>
where
    P: TextProvider,
{
    provider: P,
}

impl<P> LlmContentGenerator<P>
where
    P: TextProvider,
{
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P> ContentGenerator for LlmContentGenerator<P>
where
    P: TextProvider,
{
    async fn generate(&self, key: GenerationKey) -> GenerationResult<String> {
        let prompts = PromptPair::for_key(key);
        let provider = self.provider.provider_id();

        debug!(%key, %provider, "Requesting content");

        let completion = self
            .provider
            .complete(&prompts.system, &prompts.user)
            .await
            .map_err(|reason| {
                warn!(%key, %provider, %reason, "Provider request failed");
                GenerationError::ProviderError { provider, reason }
            })?;

        let content = completion.content.trim();
        if content.is_empty() {
            return Err(GenerationError::EmptyResponse { key });
        }

        debug!(
            %key,
            model = %completion.model_used,
            tokens = completion.usage.total(),
            response_ms = completion.response_time.as_millis() as u64,
            "Content generated"
        );

        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockTextProvider;
    use crate::types::Completion;
    use mockall::predicate::*;
    use shared::{ApiFailure, DifficultyLevel, LanguageCode, ProviderId, TokenUsage};
    use std::time::Duration;

    fn completion(content: &str) -> Completion {
        Completion {
            content: content.to_string(),
            model_used: "test-model".to_string(),
            usage: TokenUsage { input_tokens: 10, output_tokens: 20 },
            response_time: Duration::from_millis(5),
        }
    }

    fn provider_returning(result: Result<Completion, ApiFailure>) -> MockTextProvider {
        let mut provider = MockTextProvider::new();
        provider.expect_provider_id().return_const(ProviderId::Gemini);
        provider
            .expect_complete()
            .times(1)
            .return_once(move |_, _| result);
        provider
    }

    #[tokio::test]
    async fn test_sends_templated_prompts_once() {
        let key = GenerationKey::new(LanguageCode::Chinese, DifficultyLevel::High);
        let expected = PromptPair::for_key(key);

        let mut provider = MockTextProvider::new();
        provider.expect_provider_id().return_const(ProviderId::OpenAI);
        provider
            .expect_complete()
            .with(eq(expected.system.clone()), eq(expected.user.clone()))
            .times(1)
            .returning(|_, _| Ok(completion("1️⃣ *你好*")));

        let generator = LlmContentGenerator::new(provider);
        let content = generator.generate(key).await.unwrap();

        assert_eq!(content, "1️⃣ *你好*");
    }

    #[tokio::test]
    async fn test_provider_failure_maps_to_generation_error() {
        let generator = LlmContentGenerator::new(provider_returning(Err(ApiFailure::RateLimitExceeded)));
        let key = GenerationKey::new(LanguageCode::Japanese, DifficultyLevel::Low);

        let err = generator.generate(key).await.unwrap_err();
        assert_eq!(
            err,
            GenerationError::ProviderError {
                provider: ProviderId::Gemini,
                reason: ApiFailure::RateLimitExceeded,
            }
        );
    }

    #[tokio::test]
    async fn test_blank_content_is_an_empty_response() {
        let generator = LlmContentGenerator::new(provider_returning(Ok(completion("  \n "))));
        let key = GenerationKey::new(LanguageCode::English, DifficultyLevel::Mid);

        let err = generator.generate(key).await.unwrap_err();
        assert_eq!(err, GenerationError::EmptyResponse { key });
    }

    #[tokio::test]
    async fn test_content_is_trimmed() {
        let generator = LlmContentGenerator::new(provider_returning(Ok(completion("\nsentence\n\n"))));
        let key = GenerationKey::new(LanguageCode::English, DifficultyLevel::Low);

        assert_eq!(generator.generate(key).await.unwrap(), "sentence");
    }
}
