//! Subscriber directory clients

use std::path::PathBuf;
use std::time::Duration;
use async_trait::async_trait;
use tracing::debug;

use serde_json::Value;

use shared::SubscriberListing;
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::traits::DirectoryClient;

/// Reads subscribers from a PostgREST endpoint (the Supabase REST API)
pub struct PostgrestDirectory {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl PostgrestDirectory {
    pub const DEFAULT_TABLE: &'static str = "users";

    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> CoordinatorResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoordinatorError::directory(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            table: Self::DEFAULT_TABLE.to_string(),
        })
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }
}

#[async_trait]
impl DirectoryClient for PostgrestDirectory {
    async fn fetch_all(&self) -> CoordinatorResult<SubscriberListing> {
        let response = self
            .client
            .get(self.table_url())
            .query(&[("select", "*")])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| CoordinatorError::directory(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoordinatorError::directory(format!("HTTP {status}: {body}")));
        }

        let rows: Vec<Value> = response
            .json()
            .await
            .map_err(|e| CoordinatorError::directory(format!("failed to parse subscriber rows: {e}")))?;

        let listing = SubscriberListing::from_rows(rows);
        debug!(
            count = listing.subscribers.len(),
            unreadable = listing.unreadable.len(),
            table = %self.table,
            "Fetched subscribers"
        );
        Ok(listing)
    }
}

/// Reads subscribers from a JSON array on disk, for dry runs without the hosted store
pub struct FileDirectory {
    path: PathBuf,
}

impl FileDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DirectoryClient for FileDirectory {
    async fn fetch_all(&self) -> CoordinatorResult<SubscriberListing> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CoordinatorError::directory(format!("failed to read {}: {e}", self.path.display())))?;
        let rows: Vec<Value> = serde_json::from_str(&raw)
            .map_err(|e| CoordinatorError::directory(format!("failed to parse {}: {e}", self.path.display())))?;

        let listing = SubscriberListing::from_rows(rows);
        debug!(
            count = listing.subscribers.len(),
            unreadable = listing.unreadable.len(),
            path = %self.path.display(),
            "Loaded subscribers from file"
        );
        Ok(listing)
    }
}
