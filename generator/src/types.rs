//! Generator-specific data types

use std::time::Duration;
use shared::{ProviderId, TokenUsage};

/// Provider response data
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    pub model_used: String,
    pub usage: TokenUsage,
    pub response_time: Duration,
}

/// Connection settings for an OpenAI-compatible chat-completions endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub provider: ProviderId,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl ProviderSettings {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Settings with the provider's stock endpoint and model
    pub fn for_provider(provider: ProviderId, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            base_url: Self::default_base_url(provider).to_string(),
            model: Self::default_model(provider).to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Environment variable holding the provider's API key
    pub fn api_key_var(provider: ProviderId) -> &'static str {
        match provider {
            ProviderId::OpenAI => "OPENAI_API_KEY",
            ProviderId::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn default_base_url(provider: ProviderId) -> &'static str {
        match provider {
            ProviderId::OpenAI => "https://api.openai.com/v1",
            // Gemini's OpenAI-compatible surface
            ProviderId::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
        }
    }

    pub fn default_model(provider: ProviderId) -> &'static str {
        match provider {
            ProviderId::OpenAI => "gpt-4o-mini",
            ProviderId::Gemini => "gemini-2.5-flash-lite",
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
