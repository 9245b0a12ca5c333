//! Message composition and hand-off to the messaging provider

use tracing::debug;

use shared::{GenerationKey, LanguageCode, Subscriber};
use crate::error::DeliveryError;
use crate::traits::Messenger;

/// Fixed header placed above the generated body
pub fn header(language: LanguageCode) -> String {
    format!("📚 *오늘의 {} 학습* 📚", language.display_name())
}

/// Header, blank line, body
pub fn compose(language: LanguageCode, body: &str) -> String {
    format!("{}\n\n{}", header(language), body)
}

pub struct Dispatcher<M>
where
    M: Messenger,
{
    messenger: M,
}

impl<M> Dispatcher<M>
where
    M: Messenger,
{
    pub fn new(messenger: M) -> Self {
        Self { messenger }
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    /// Deliver one subscriber's message. Every failure comes back as a `DeliveryError`.
    pub async fn send(&self, subscriber: &Subscriber, key: GenerationKey, body: &str) -> Result<(), DeliveryError> {
        let text = compose(key.language, body);
        debug!(subscriber = subscriber.id, recipient = %subscriber.recipient_id, %key, bytes = text.len(), "Sending message");
        self.messenger.send(&subscriber.recipient_id, &text).await
    }
}
