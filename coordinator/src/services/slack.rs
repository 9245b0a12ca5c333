//! Slack Web API messenger

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::MessengerSettings;
use crate::error::{CoordinatorError, CoordinatorResult, DeliveryError};
use crate::traits::Messenger;

/// Slack error codes meaning the destination does not exist or cannot be reached by the bot
const DESTINATION_ERRORS: &[&str] = &["channel_not_found", "user_not_found", "not_in_channel", "is_archived"];

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Sends direct messages through `chat.postMessage`
pub struct SlackMessenger {
    client: reqwest::Client,
    settings: MessengerSettings,
}

impl SlackMessenger {
    pub fn new(settings: MessengerSettings) -> CoordinatorResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| CoordinatorError::config("SLACK_API_URL", format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, settings })
    }

    fn post_message_url(&self) -> String {
        format!("{}/chat.postMessage", self.settings.api_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Messenger for SlackMessenger {
    async fn send(&self, destination: &str, text: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(self.post_message_url())
            .bearer_auth(&self.settings.bot_token)
            .json(&serde_json::json!({
                "channel": destination,
                "text": text,
            }))
            .send()
            .await
            .map_err(|e| DeliveryError::Unreachable { message: e.to_string() })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Rejected {
                reason: format!("HTTP {}", status.as_u16()),
            });
        }

        // Slack reports application errors with HTTP 200 and ok=false
        let body: PostMessageResponse = response
            .json()
            .await
            .map_err(|e| DeliveryError::Rejected { reason: format!("unreadable response: {e}") })?;

        if body.ok {
            return Ok(());
        }

        let reason = body.error.unwrap_or_else(|| "unknown_error".to_string());
        if DESTINATION_ERRORS.contains(&reason.as_str()) {
            Err(DeliveryError::DestinationNotFound {
                destination: destination.to_string(),
            })
        } else {
            Err(DeliveryError::Rejected { reason })
        }
    }
}
