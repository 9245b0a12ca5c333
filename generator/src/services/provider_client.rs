//! OpenAI-compatible chat-completions client
//!
//! OpenAI serves this API natively and Gemini exposes the same surface under
//! its `/v1beta/openai` prefix, so one client covers both providers.

use async_trait::async_trait;

use shared::{ApiFailure, ProviderId, TokenUsage};
use crate::error::{GenerationError, GenerationResult};
use crate::traits::TextProvider;
use crate::types::{Completion, ProviderSettings};

/// Real text provider speaking the chat-completions protocol
pub struct OpenAiCompatibleProvider {
    settings: ProviderSettings,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    /// Create a provider client; fails when the HTTP client cannot be built
    pub fn new(settings: ProviderSettings) -> GenerationResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GenerationError::ConfigError {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }
}

#[async_trait]
impl TextProvider for OpenAiCompatibleProvider {
    fn provider_id(&self) -> ProviderId {
        self.settings.provider
    }

    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<Completion, ApiFailure> {
        let request_start = std::time::Instant::now();

        let request_body = serde_json::json!({
            "model": self.settings.model,
            "messages": [
                {
                    "role": "system",
                    "content": system_prompt
                },
                {
                    "role": "user",
                    "content": user_prompt
                }
            ]
        });

        let response = self
            .client
            .post(self.settings.completions_url())
            .bearer_auth(&self.settings.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ApiFailure::NetworkError(e.to_string()))?;

        let response_time = request_start.elapsed();

        if !response.status().is_success() {
            return Err(ApiFailure::from_status(response.status().as_u16()));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ApiFailure::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let message = response_json
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .ok_or_else(|| ApiFailure::InvalidResponse("No choices in response".to_string()))?;

        // A null or missing content is an empty answer, judged by the generator
        let content = message
            .get("content")
            .and_then(|content| content.as_str())
            .unwrap_or_default();

        let usage = response_json.get("usage");
        let input_tokens = usage
            .and_then(|u| u.get("prompt_tokens"))
            .and_then(|t| t.as_u64())
            .unwrap_or(0);
        let output_tokens = usage
            .and_then(|u| u.get("completion_tokens"))
            .and_then(|t| t.as_u64())
            .unwrap_or(0);

        let model_used = response_json
            .get("model")
            .and_then(|m| m.as_str())
            .unwrap_or(&self.settings.model)
            .to_string();

        Ok(Completion {
            content: content.to_string(),
            model_used,
            usage: TokenUsage { input_tokens, output_tokens },
            response_time,
        })
    }
}
