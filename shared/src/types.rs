//! Core types used throughout the dispatch system

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::{SharedError, SharedResult};

/// Identifier attached to every log line of one batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run_{}", self.0.simple())
    }
}

/// Language a subscriber is learning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LanguageCode {
    #[serde(rename = "jp")]
    Japanese,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "zh")]
    Chinese,
}

impl LanguageCode {
    pub const ALL: [LanguageCode; 3] = [LanguageCode::Japanese, LanguageCode::English, LanguageCode::Chinese];

    /// Used when a stored language is missing or unrecognized
    pub const DEFAULT: LanguageCode = LanguageCode::Japanese;

    /// Wire code as stored in the subscriber directory
    pub fn code(&self) -> &'static str {
        match self {
            LanguageCode::Japanese => "jp",
            LanguageCode::English => "en",
            LanguageCode::Chinese => "zh",
        }
    }

    /// Name shown to recipients (recipients read Korean)
    pub fn display_name(&self) -> &'static str {
        match self {
            LanguageCode::Japanese => "일본어",
            LanguageCode::English => "영어",
            LanguageCode::Chinese => "중국어",
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl LanguageCode {
    /// Lenient parse: a missing or unrecognized value becomes [`LanguageCode::DEFAULT`],
    /// with the reason returned alongside
    pub fn resolve(raw: Option<&str>) -> (Self, Option<SharedError>) {
        match raw.map(LanguageCode::from_str) {
            Some(Ok(language)) => (language, None),
            Some(Err(e)) => (Self::DEFAULT, Some(e)),
            None => (Self::DEFAULT, Some(SharedError::MissingPreference { field: "language" })),
        }
    }
}

impl FromStr for LanguageCode {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jp" => Ok(LanguageCode::Japanese),
            "en" => Ok(LanguageCode::English),
            "zh" => Ok(LanguageCode::Chinese),
            _ => Err(SharedError::UnknownLanguage { value: s.to_string() }),
        }
    }
}

/// Difficulty tier of the generated sentences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Low,
    Mid,
    High,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [DifficultyLevel::Low, DifficultyLevel::Mid, DifficultyLevel::High];

    /// Used when a stored difficulty is missing or unrecognized
    pub const DEFAULT: DifficultyLevel = DifficultyLevel::Mid;

    pub fn code(&self) -> &'static str {
        match self {
            DifficultyLevel::Low => "low",
            DifficultyLevel::Mid => "mid",
            DifficultyLevel::High => "high",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl DifficultyLevel {
    /// Lenient parse: a missing or unrecognized value becomes [`DifficultyLevel::DEFAULT`]
    pub fn resolve(raw: Option<&str>) -> (Self, Option<SharedError>) {
        match raw.map(DifficultyLevel::from_str) {
            Some(Ok(difficulty)) => (difficulty, None),
            Some(Err(e)) => (Self::DEFAULT, Some(e)),
            None => (Self::DEFAULT, Some(SharedError::MissingPreference { field: "difficulty" })),
        }
    }
}

impl FromStr for DifficultyLevel {
    type Err = SharedError;

    /// Accepts the canonical codes and the Korean labels (하/중/상) written by the sign-up form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "하" => Ok(DifficultyLevel::Low),
            "mid" | "중" => Ok(DifficultyLevel::Mid),
            "high" | "상" => Ok(DifficultyLevel::High),
            _ => Err(SharedError::UnknownDifficulty { value: s.to_string() }),
        }
    }
}

/// One unit of content-generation work: every subscriber sharing a key receives the same text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GenerationKey {
    pub language: LanguageCode,
    pub difficulty: DifficultyLevel,
}

impl GenerationKey {
    pub const ALL: [GenerationKey; 9] = [
        GenerationKey::new(LanguageCode::Japanese, DifficultyLevel::Low),
        GenerationKey::new(LanguageCode::Japanese, DifficultyLevel::Mid),
        GenerationKey::new(LanguageCode::Japanese, DifficultyLevel::High),
        GenerationKey::new(LanguageCode::English, DifficultyLevel::Low),
        GenerationKey::new(LanguageCode::English, DifficultyLevel::Mid),
        GenerationKey::new(LanguageCode::English, DifficultyLevel::High),
        GenerationKey::new(LanguageCode::Chinese, DifficultyLevel::Low),
        GenerationKey::new(LanguageCode::Chinese, DifficultyLevel::Mid),
        GenerationKey::new(LanguageCode::Chinese, DifficultyLevel::High),
    ];

    pub const fn new(language: LanguageCode, difficulty: DifficultyLevel) -> Self {
        Self { language, difficulty }
    }

    /// Strict parse of raw stored values; missing values are errors
    pub fn parse(language: Option<&str>, difficulty: Option<&str>) -> SharedResult<Self> {
        let language: LanguageCode = language
            .ok_or(SharedError::MissingPreference { field: "language" })?
            .parse()?;
        let difficulty: DifficultyLevel = difficulty
            .ok_or(SharedError::MissingPreference { field: "difficulty" })?
            .parse()?;
        Ok(Self { language, difficulty })
    }

    /// Lenient parse: unrecognized or missing language becomes `jp`, unrecognized or
    /// missing difficulty becomes `mid`. Every substitution is reported in `issues`.
    pub fn resolve(language: Option<&str>, difficulty: Option<&str>) -> KeyResolution {
        let (language, language_issue) = LanguageCode::resolve(language);
        let (difficulty, difficulty_issue) = DifficultyLevel::resolve(difficulty);

        KeyResolution {
            key: Self { language, difficulty },
            issues: language_issue.into_iter().chain(difficulty_issue).collect(),
        }
    }
}

impl fmt::Display for GenerationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.language, self.difficulty)
    }
}

/// Result of leniently resolving stored preferences into a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyResolution {
    pub key: GenerationKey,
    pub issues: Vec<SharedError>,
}

impl KeyResolution {
    pub fn is_exact(&self) -> bool {
        self.issues.is_empty()
    }
}

/// A subscriber row as delivered by the directory. Immutable for the duration of a run.
///
/// Field decoding is lenient so one damaged column only affects its own row:
/// a missing or non-string recipient becomes empty, and a non-string
/// preference is kept as its JSON text (and later fails to resolve).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    #[serde(deserialize_with = "lenient_id")]
    pub id: i64,
    /// Messaging-provider identifier of the recipient (a Slack user id)
    #[serde(rename = "slack_user_id", alias = "recipient_id", default, deserialize_with = "lenient_recipient")]
    pub recipient_id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub difficulty: Option<String>,
}

impl Subscriber {
    pub fn new(id: i64, recipient_id: impl Into<String>, language: &str, difficulty: &str) -> Self {
        Self {
            id,
            recipient_id: recipient_id.into(),
            language: Some(language.to_string()),
            difficulty: Some(difficulty.to_string()),
        }
    }

    pub fn key_resolution(&self) -> KeyResolution {
        GenerationKey::resolve(self.language.as_deref(), self.difficulty.as_deref())
    }

    /// A blank recipient cannot be addressed
    pub fn has_recipient(&self) -> bool {
        !self.recipient_id.trim().is_empty()
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| serde::de::Error::custom(format!("unusable subscriber id: {value}")))
}

fn lenient_recipient<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// A directory row that could not be read as a subscriber at all
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableRow {
    /// Position in the directory listing
    pub position: usize,
    pub reason: String,
}

/// Subscribers in directory order, plus the rows that could not be read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriberListing {
    pub subscribers: Vec<Subscriber>,
    pub unreadable: Vec<UnreadableRow>,
}

impl SubscriberListing {
    /// Decode raw rows one at a time; a bad row never hides the others
    pub fn from_rows(rows: Vec<Value>) -> Self {
        let mut listing = Self::default();
        for (position, row) in rows.into_iter().enumerate() {
            match serde_json::from_value::<Subscriber>(row) {
                Ok(subscriber) => listing.subscribers.push(subscriber),
                Err(e) => listing.unreadable.push(UnreadableRow {
                    position,
                    reason: e.to_string(),
                }),
            }
        }
        listing
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty() && self.unreadable.is_empty()
    }
}

impl From<Vec<Subscriber>> for SubscriberListing {
    fn from(subscribers: Vec<Subscriber>) -> Self {
        Self {
            subscribers,
            unreadable: Vec::new(),
        }
    }
}

/// Text-generation providers the generator can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderId {
    OpenAI,
    Gemini,
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderId::OpenAI => write!(f, "openai"),
            ProviderId::Gemini => write!(f, "gemini"),
        }
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderId::OpenAI),
            "gemini" | "google" => Ok(ProviderId::Gemini),
            _ => Err(format!("Unknown provider: {s}")),
        }
    }
}

/// Token usage information for LLM requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Classification of a failed provider call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiFailure {
    AuthenticationFailed,
    RateLimitExceeded,
    ServiceUnavailable,
    ServerError(String),
    NetworkError(String),
    InvalidResponse(String),
}

impl ApiFailure {
    /// Map a non-success HTTP status to a failure
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ApiFailure::AuthenticationFailed,
            429 => ApiFailure::RateLimitExceeded,
            503 => ApiFailure::ServiceUnavailable,
            other => ApiFailure::ServerError(format!("HTTP {other}")),
        }
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFailure::AuthenticationFailed => write!(f, "authentication failed"),
            ApiFailure::RateLimitExceeded => write!(f, "rate limit exceeded"),
            ApiFailure::ServiceUnavailable => write!(f, "service unavailable"),
            ApiFailure::ServerError(status) => write!(f, "server error: {status}"),
            ApiFailure::NetworkError(message) => write!(f, "network error: {message}"),
            ApiFailure::InvalidResponse(message) => write!(f, "invalid response: {message}"),
        }
    }
}

impl std::error::Error for ApiFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes_round_trip_through_display() {
        for language in LanguageCode::ALL {
            assert_eq!(language.code().parse::<LanguageCode>().unwrap(), language);
        }
        assert_eq!(" EN ".parse::<LanguageCode>().unwrap(), LanguageCode::English);
    }

    #[test]
    fn test_korean_difficulty_labels_are_aliases() {
        assert_eq!("하".parse::<DifficultyLevel>().unwrap(), DifficultyLevel::Low);
        assert_eq!("중".parse::<DifficultyLevel>().unwrap(), DifficultyLevel::Mid);
        assert_eq!("상".parse::<DifficultyLevel>().unwrap(), DifficultyLevel::High);
    }

    #[test]
    fn test_single_field_resolution() {
        assert_eq!(LanguageCode::resolve(Some("zh")), (LanguageCode::Chinese, None));
        assert_eq!(
            LanguageCode::resolve(Some("ko")),
            (LanguageCode::Japanese, Some(SharedError::UnknownLanguage { value: "ko".to_string() }))
        );
        assert_eq!(DifficultyLevel::resolve(Some("상")), (DifficultyLevel::High, None));
        assert_eq!(
            DifficultyLevel::resolve(None),
            (DifficultyLevel::Mid, Some(SharedError::MissingPreference { field: "difficulty" }))
        );
    }

    #[test]
    fn test_unknown_language_falls_back_to_japanese() {
        let resolution = GenerationKey::resolve(Some("fr"), Some("high"));

        assert_eq!(resolution.key, GenerationKey::new(LanguageCode::Japanese, DifficultyLevel::High));
        assert_eq!(resolution.issues, vec![SharedError::UnknownLanguage { value: "fr".to_string() }]);
        assert!(!resolution.is_exact());
    }

    #[test]
    fn test_unknown_difficulty_falls_back_to_mid_for_same_language() {
        let resolution = GenerationKey::resolve(Some("zh"), Some("extreme"));

        assert_eq!(resolution.key, GenerationKey::new(LanguageCode::Chinese, DifficultyLevel::Mid));
        assert_eq!(resolution.issues.len(), 1);
    }

    #[test]
    fn test_missing_preferences_fall_back_to_defaults() {
        let resolution = GenerationKey::resolve(None, None);

        assert_eq!(resolution.key, GenerationKey::new(LanguageCode::DEFAULT, DifficultyLevel::DEFAULT));
        assert_eq!(resolution.issues.len(), 2);
    }

    #[test]
    fn test_strict_parse_rejects_what_resolve_substitutes() {
        assert!(GenerationKey::parse(Some("jp"), Some("low")).is_ok());
        assert!(matches!(
            GenerationKey::parse(Some("de"), Some("low")),
            Err(SharedError::UnknownLanguage { .. })
        ));
        assert!(matches!(
            GenerationKey::parse(Some("en"), None),
            Err(SharedError::MissingPreference { field: "difficulty" })
        ));
    }

    #[test]
    fn test_all_keys_are_distinct() {
        let unique: std::collections::HashSet<_> = GenerationKey::ALL.iter().collect();
        assert_eq!(unique.len(), 9);
    }

    #[test]
    fn test_subscriber_deserializes_directory_row() {
        let row = r#"{"id": 7, "slack_user_id": "U123", "language": "en", "difficulty": "중", "created_at": "2024-01-01"}"#;
        let subscriber: Subscriber = serde_json::from_str(row).unwrap();

        assert_eq!(subscriber.recipient_id, "U123");
        assert_eq!(subscriber.key_resolution().key, GenerationKey::new(LanguageCode::English, DifficultyLevel::Mid));
    }

    #[test]
    fn test_subscriber_row_without_preferences() {
        let row = r#"{"id": 8, "slack_user_id": "U999"}"#;
        let subscriber: Subscriber = serde_json::from_str(row).unwrap();

        assert_eq!(subscriber.language, None);
        assert!(!subscriber.key_resolution().is_exact());
    }

    #[test]
    fn test_damaged_columns_stay_in_their_row() {
        let row = serde_json::json!({"id": "12", "slack_user_id": null, "language": 3, "difficulty": ["high"]});
        let subscriber: Subscriber = serde_json::from_value(row).unwrap();

        assert_eq!(subscriber.id, 12);
        assert!(!subscriber.has_recipient());
        assert_eq!(subscriber.language.as_deref(), Some("3"));
        assert_eq!(
            subscriber.key_resolution().issues,
            vec![
                SharedError::UnknownLanguage { value: "3".to_string() },
                SharedError::UnknownDifficulty { value: "[\"high\"]".to_string() },
            ]
        );
    }

    #[test]
    fn test_listing_keeps_readable_rows() {
        let rows = vec![
            serde_json::json!({"id": 1, "slack_user_id": "U1", "language": "jp", "difficulty": "low"}),
            serde_json::json!("not a row"),
            serde_json::json!({"slack_user_id": "U3"}),
            serde_json::json!({"id": 4, "slack_user_id": "U4", "language": "en", "difficulty": "mid"}),
        ];

        let listing = SubscriberListing::from_rows(rows);

        let ids: Vec<i64> = listing.subscribers.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 4]);
        let positions: Vec<usize> = listing.unreadable.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 2]);
        assert!(!listing.is_empty());
        assert!(SubscriberListing::default().is_empty());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiFailure::from_status(401), ApiFailure::AuthenticationFailed);
        assert_eq!(ApiFailure::from_status(429), ApiFailure::RateLimitExceeded);
        assert_eq!(ApiFailure::from_status(500), ApiFailure::ServerError("HTTP 500".to_string()));
    }
}
