//! Trait definitions with mockall annotations for testing
//!
//! The coordinator reaches the subscriber store and the messaging provider only
//! through these seams, so tests can substitute doubles for both.

use async_trait::async_trait;

use shared::SubscriberListing;
use crate::error::{CoordinatorResult, DeliveryError};

/// Read-only access to the current subscriber set
#[mockall::automock]
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Fetch every registered subscriber. Only a failure to obtain the listing
    /// is an error; rows that cannot be read are reported inside it.
    async fn fetch_all(&self) -> CoordinatorResult<SubscriberListing>;
}

/// Messaging provider transport
#[mockall::automock]
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Deliver `text` to the provider-specific destination id
    async fn send(&self, destination: &str, text: &str) -> Result<(), DeliveryError>;
}
