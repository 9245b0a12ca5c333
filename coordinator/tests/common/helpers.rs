//! Test doubles and builder for coordinator tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use coordinator::traits::MockDirectoryClient;
use coordinator::{CoordinatorError, DeliveryError, Messenger, PreferencePolicy, RunCoordinator, RunOptions};
use generator::{ContentGenerator, GenerationError, GenerationResult};
use shared::{ApiFailure, GenerationKey, ProviderId, Subscriber, SubscriberListing};
use super::fixtures::TestFixtures;

pub type TestCoordinator = RunCoordinator<MockDirectoryClient, ScriptedGenerator, RecordingMessenger>;

/// Content generator that records every call and fails for configured keys
#[derive(Default)]
pub struct ScriptedGenerator {
    calls: Mutex<Vec<GenerationKey>>,
    failing: HashSet<GenerationKey>,
    delay: Duration,
}

impl ScriptedGenerator {
    pub fn calls(&self) -> Vec<GenerationKey> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate(&self, key: GenerationKey) -> GenerationResult<String> {
        self.calls.lock().unwrap().push(key);
        tokio::time::sleep(self.delay).await;

        if self.failing.contains(&key) {
            return Err(GenerationError::ProviderError {
                provider: ProviderId::Gemini,
                reason: ApiFailure::ServiceUnavailable,
            });
        }
        Ok(TestFixtures::expected_content(key))
    }
}

/// Messenger that records deliveries and fails or panics for configured recipients
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(String, String)>>,
    failing: HashMap<String, DeliveryError>,
    panicking: HashSet<String>,
}

impl RecordingMessenger {
    /// (destination, text) pairs in delivery order
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn text_for(&self, destination: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .find(|(d, _)| d == destination)
            .map(|(_, text)| text)
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, destination: &str, text: &str) -> Result<(), DeliveryError> {
        if self.panicking.contains(destination) {
            panic!("messenger crashed for {destination}");
        }
        if let Some(error) = self.failing.get(destination) {
            return Err(error.clone());
        }
        self.sent.lock().unwrap().push((destination.to_string(), text.to_string()));
        Ok(())
    }
}

/// Builder for coordinators wired to test doubles
pub struct CoordinatorBuilder {
    directory: MockDirectoryClient,
    generator: ScriptedGenerator,
    messenger: RecordingMessenger,
    options: RunOptions,
}

impl CoordinatorBuilder {
    /// Empty directory, generator and messenger that always succeed
    pub fn new() -> Self {
        Self {
            directory: MockDirectoryClient::new(),
            generator: ScriptedGenerator::default(),
            messenger: RecordingMessenger::default(),
            options: RunOptions::default(),
        }
        .with_subscribers(Vec::new())
    }

    pub fn with_subscribers(self, subscribers: Vec<Subscriber>) -> Self {
        self.with_listing(SubscriberListing::from(subscribers))
    }

    pub fn with_listing(mut self, listing: SubscriberListing) -> Self {
        let mut directory = MockDirectoryClient::new();
        directory
            .expect_fetch_all()
            .returning(move || Ok(listing.clone()))
            .times(0..);
        self.directory = directory;
        self
    }

    pub fn with_directory_failure(mut self, message: &str) -> Self {
        let message = message.to_string();
        let mut directory = MockDirectoryClient::new();
        directory
            .expect_fetch_all()
            .returning(move || Err(CoordinatorError::directory(message.clone())));
        self.directory = directory;
        self
    }

    pub fn with_failing_key(mut self, key: GenerationKey) -> Self {
        self.generator.failing.insert(key);
        self
    }

    pub fn with_generation_delay(mut self, delay: Duration) -> Self {
        self.generator.delay = delay;
        self
    }

    pub fn with_failing_recipient(mut self, recipient: &str, error: DeliveryError) -> Self {
        self.messenger.failing.insert(recipient.to_string(), error);
        self
    }

    pub fn with_panicking_recipient(mut self, recipient: &str) -> Self {
        self.messenger.panicking.insert(recipient.to_string());
        self
    }

    pub fn with_policy(mut self, policy: PreferencePolicy) -> Self {
        self.options.policy = policy;
        self
    }

    pub fn with_concurrency(mut self, generation: usize, dispatch: usize) -> Self {
        self.options.generation_concurrency = generation;
        self.options.dispatch_concurrency = dispatch;
        self
    }

    pub fn build(self) -> TestCoordinator {
        RunCoordinator::new(self.directory, self.generator, self.messenger, self.options)
    }
}

impl Default for CoordinatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
