//! Run configuration loaded from the environment
//!
//! ## Configuration Sources
//! Values are loaded from:
//! 1. `.env` file in the current directory or parent directories (if present)
//! 2. System environment variables
//!
//! Environment variables take precedence over .env file values.
//!
//! ## Required
//! - `OPENAI_API_KEY` or `GEMINI_API_KEY`, matching `LLM_PROVIDER`
//! - `SLACK_BOT_TOKEN`
//! - `SUPABASE_URL`, `SUPABASE_KEY` (unless subscribers come from a file)
//!
//! ## Optional
//! - `LLM_PROVIDER`: `openai` or `gemini` (default `gemini`)
//! - `LLM_MODEL`, `LLM_BASE_URL`: provider overrides
//! - `SLACK_API_URL`: Slack Web API base (default `https://slack.com/api`)
//! - `UNKNOWN_PREFERENCE_POLICY`: `fallback` (default) or `reject`
//! - `HTTP_TIMEOUT_SECS`: outbound request timeout (default 60)

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use generator::ProviderSettings;
use shared::ProviderId;
use crate::error::{CoordinatorError, CoordinatorResult};

pub const DEFAULT_PROVIDER: ProviderId = ProviderId::Gemini;
pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";
pub const DEFAULT_GENERATION_CONCURRENCY: usize = 3;
pub const DEFAULT_DISPATCH_CONCURRENCY: usize = 4;

/// What to do with a subscriber whose stored language or difficulty is missing or unrecognized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreferencePolicy {
    /// Substitute the default language (`jp`) and/or difficulty (`mid`) and deliver
    #[default]
    Fallback,
    /// Treat it as a data-integrity error: mark the subscriber failed, deliver nothing
    Reject,
}

impl FromStr for PreferencePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fallback" => Ok(PreferencePolicy::Fallback),
            "reject" => Ok(PreferencePolicy::Reject),
            _ => Err(format!("Unknown preference policy: {s} (expected fallback or reject)")),
        }
    }
}

/// Knobs for one run of the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub policy: PreferencePolicy,
    /// Keys generated at the same time
    pub generation_concurrency: usize,
    /// Messages in flight at the same time
    pub dispatch_concurrency: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            policy: PreferencePolicy::default(),
            generation_concurrency: DEFAULT_GENERATION_CONCURRENCY,
            dispatch_concurrency: DEFAULT_DISPATCH_CONCURRENCY,
        }
    }
}

/// Slack Web API settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessengerSettings {
    pub api_url: String,
    pub bot_token: String,
    pub timeout: Duration,
}

/// Where subscribers are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectorySource {
    /// Hosted PostgREST store (Supabase)
    Postgrest,
    /// Local JSON file with the same row shape
    File(PathBuf),
}

/// Resolved directory settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectorySettings {
    Postgrest { url: String, api_key: String, timeout: Duration },
    File(PathBuf),
}

/// Everything the binary needs to build its collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    pub provider: ProviderSettings,
    pub messenger: MessengerSettings,
    pub directory: DirectorySettings,
    pub options: RunOptions,
}

impl DispatchConfig {
    /// Load `.env` (if present) and read the process environment
    pub fn from_env(source: DirectorySource) -> CoordinatorResult<Self> {
        // Silently ignored when no .env file exists
        let _ = dotenvy::dotenv();
        Self::from_vars(|name| std::env::var(name).ok(), source)
    }

    /// Read values from an explicit dotenv file, with the process environment taking precedence
    pub fn from_env_file(path: &Path, source: DirectorySource) -> CoordinatorResult<Self> {
        let file_vars = dotenvy::from_path_iter(path)
            .and_then(|iter| iter.collect::<Result<HashMap<String, String>, _>>())
            .map_err(|e| CoordinatorError::config(path.display().to_string(), e.to_string()))?;

        Self::from_vars(
            |name| std::env::var(name).ok().or_else(|| file_vars.get(name).cloned()),
            source,
        )
    }

    /// Build the configuration from a variable lookup. Blank values count as missing.
    /// Every missing required variable is reported in one error.
    pub fn from_vars<F>(lookup: F, source: DirectorySource) -> CoordinatorResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let provider = match get("LLM_PROVIDER") {
            Some(raw) => raw.parse::<ProviderId>().map_err(|_| {
                CoordinatorError::config(
                    "LLM_PROVIDER",
                    format!("'{raw}' is not supported (supported: openai, gemini)"),
                )
            })?,
            None => DEFAULT_PROVIDER,
        };

        let timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| CoordinatorError::config("HTTP_TIMEOUT_SECS", format!("'{raw}' is not a positive integer")))?,
            None => ProviderSettings::DEFAULT_TIMEOUT,
        };

        let policy = match get("UNKNOWN_PREFERENCE_POLICY") {
            Some(raw) => raw
                .parse::<PreferencePolicy>()
                .map_err(|message| CoordinatorError::config("UNKNOWN_PREFERENCE_POLICY", message))?,
            None => PreferencePolicy::default(),
        };

        // Required values, gathered so the operator sees every gap at once
        let api_key_var = ProviderSettings::api_key_var(provider);
        let mut missing = Vec::new();
        let mut require = |name: &'static str| {
            get(name).unwrap_or_else(|| {
                missing.push(name);
                String::new()
            })
        };

        let api_key = require(api_key_var);
        let bot_token = require("SLACK_BOT_TOKEN");
        let directory = match source {
            DirectorySource::Postgrest => DirectorySettings::Postgrest {
                url: require("SUPABASE_URL"),
                api_key: require("SUPABASE_KEY"),
                timeout,
            },
            DirectorySource::File(path) => DirectorySettings::File(path),
        };

        if !missing.is_empty() {
            return Err(CoordinatorError::config(
                missing.join(", "),
                "required environment variables are not set",
            ));
        }

        let mut provider_settings = ProviderSettings::for_provider(provider, api_key)
            .with_timeout(timeout);
        if let Some(model) = get("LLM_MODEL") {
            provider_settings = provider_settings.with_model(model);
        }
        if let Some(base_url) = get("LLM_BASE_URL") {
            provider_settings = provider_settings.with_base_url(validate_url("LLM_BASE_URL", &base_url)?);
        }

        let api_url = match get("SLACK_API_URL") {
            Some(url) => validate_url("SLACK_API_URL", &url)?,
            None => DEFAULT_SLACK_API_URL.to_string(),
        };

        let directory = match directory {
            DirectorySettings::Postgrest { url, api_key, timeout } => DirectorySettings::Postgrest {
                url: validate_url("SUPABASE_URL", &url)?,
                api_key,
                timeout,
            },
            file => file,
        };

        Ok(Self {
            provider: provider_settings,
            messenger: MessengerSettings {
                api_url,
                bot_token,
                timeout,
            },
            directory,
            options: RunOptions { policy, ..RunOptions::default() },
        })
    }
}

fn validate_url(field: &str, raw: &str) -> CoordinatorResult<String> {
    let parsed = url::Url::parse(raw).map_err(|e| CoordinatorError::config(field, format!("invalid URL '{raw}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(raw.trim_end_matches('/').to_string()),
        scheme => Err(CoordinatorError::config(field, format!("unsupported URL scheme '{scheme}'"))),
    }
}
