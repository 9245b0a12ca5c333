//! The daily run: load, group, generate once per key, fan out

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures_util::{stream, FutureExt, StreamExt};

use generator::core::panic_message;
use generator::{ContentGenerator, GenerationCache, GenerationResult, SharedContent};
use shared::logging::{log_error, log_startup, log_success};
use shared::{run_debug, run_info, run_warn, GenerationKey, RunId, Subscriber, SubscriberListing};

use crate::config::RunOptions;
use crate::core::{
    DispatchOutcome, Dispatcher, FailureReason, Partition, RunReport, RunStatus, SubscriberOutcome,
};
use crate::error::CoordinatorResult;
use crate::traits::{DirectoryClient, Messenger};

type GeneratedContents = BTreeMap<GenerationKey, GenerationResult<SharedContent>>;

/// Runs one batch per call to [`RunCoordinator::run`]. Holds no state between runs.
pub struct RunCoordinator<D, G, M>
where
    D: DirectoryClient,
    G: ContentGenerator,
    M: Messenger,
{
    directory: D,
    generator: Arc<G>,
    dispatcher: Dispatcher<M>,
    options: RunOptions,
}

impl<D, G, M> RunCoordinator<D, G, M>
where
    D: DirectoryClient,
    G: ContentGenerator,
    M: Messenger,
{
    pub fn new(directory: D, generator: G, messenger: M, options: RunOptions) -> Self {
        Self {
            directory,
            generator: Arc::new(generator),
            dispatcher: Dispatcher::new(messenger),
            options,
        }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn messenger(&self) -> &M {
        self.dispatcher.messenger()
    }

    /// Execute one run, optionally restricted to a single recipient.
    ///
    /// Only a directory failure is returned as an error. Generation and
    /// delivery failures are recorded in the report and the run continues.
    pub async fn run(&self, target: Option<&str>) -> CoordinatorResult<RunReport> {
        let run_id = RunId::new();
        let started_at = Utc::now();

        match target {
            Some(target) => log_startup(&run_id, &format!("daily dispatch for recipient {target}")),
            None => log_startup(&run_id, "daily dispatch for all subscribers"),
        }

        let SubscriberListing { subscribers, unreadable } = self.directory.fetch_all().await.map_err(|e| {
            log_error(&run_id, "Subscriber load", &e);
            e
        })?;

        for row in &unreadable {
            run_warn!(run_id, position = row.position, reason = %row.reason, "Unreadable directory row skipped");
        }

        if subscribers.is_empty() {
            run_info!(run_id, unreadable = unreadable.len(), "No subscribers registered");
            let mut report = RunReport::empty(run_id, started_at, RunStatus::NoSubscribers);
            report.unreadable_rows = unreadable;
            return Ok(report);
        }

        let subscribers = match target {
            Some(target) => {
                let matching: Vec<Subscriber> = subscribers
                    .into_iter()
                    .filter(|s| s.recipient_id == target)
                    .collect();
                if matching.is_empty() {
                    run_warn!(run_id, recipient = target, "No subscriber matches the requested recipient");
                    let mut report = RunReport::empty(
                        run_id,
                        started_at,
                        RunStatus::NoMatchingSubscriber { target: target.to_string() },
                    );
                    report.unreadable_rows = unreadable;
                    return Ok(report);
                }
                matching
            }
            None => subscribers,
        };

        let partition = Partition::build(&subscribers, self.options.policy);
        self.log_partition(run_id, &partition);

        // Dropped at the end of the run; nothing carries over to the next one
        let cache = GenerationCache::new(Arc::clone(&self.generator));
        let contents = self.generate_all(run_id, &cache, &partition).await;

        let mut outcomes = self.dispatch_all(run_id, &partition, &contents).await;
        outcomes.extend(partition.rejected().iter().map(|rejected| {
            (
                rejected.index,
                SubscriberOutcome {
                    subscriber_id: rejected.subscriber.id,
                    recipient_id: rejected.subscriber.recipient_id.clone(),
                    key: None,
                    outcome: DispatchOutcome::Failed(rejected.reason.clone()),
                },
            )
        }));
        outcomes.sort_by_key(|(index, _)| *index);

        let mut generated_keys = Vec::new();
        let mut failed_keys = Vec::new();
        for (key, result) in contents {
            match result {
                Ok(_) => generated_keys.push(key),
                Err(e) => failed_keys.push((key, e)),
            }
        }

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            status: RunStatus::Completed,
            requested_keys: partition.keys().collect(),
            generated_keys,
            failed_keys,
            generator_calls: cache.invocations(),
            outcomes: outcomes.into_iter().map(|(_, outcome)| outcome).collect(),
            unreadable_rows: unreadable,
        };

        run_info!(
            run_id,
            sent = report.sent(),
            skipped = report.skipped(),
            failed = report.failed(),
            unreadable = report.unreadable(),
            generator_calls = report.generator_calls,
            elapsed_ms = report.elapsed().num_milliseconds(),
            "Run summary"
        );
        log_success(&run_id, &format!("Run finished: {report}"));

        Ok(report)
    }

    fn log_partition(&self, run_id: RunId, partition: &Partition) {
        for (key, member) in partition.substituted() {
            let issues: Vec<String> = member.substitutions.iter().map(ToString::to_string).collect();
            run_warn!(
                run_id,
                subscriber = member.subscriber.id,
                %key,
                issues = %issues.join("; "),
                "Unrecognized preferences, using default content"
            );
        }

        for rejected in partition.rejected() {
            run_warn!(
                run_id,
                subscriber = rejected.subscriber.id,
                reason = %rejected.reason,
                "Subscriber rejected"
            );
        }

        run_info!(
            run_id,
            subscribers = partition.member_count(),
            keys = partition.key_count(),
            rejected = partition.rejected().len(),
            "Subscribers grouped"
        );
    }

    async fn generate_all(
        &self,
        run_id: RunId,
        cache: &GenerationCache<Arc<G>>,
        partition: &Partition,
    ) -> GeneratedContents {
        let contents: GeneratedContents = stream::iter(partition.keys())
            .map(|key| async move { (key, cache.get_or_generate(key).await) })
            .buffer_unordered(self.options.generation_concurrency.max(1))
            .collect()
            .await;

        for (key, result) in &contents {
            match result {
                Ok(content) => {
                    run_debug!(run_id, %key, bytes = content.len(), "Content ready");
                }
                Err(e) => {
                    run_warn!(
                        run_id,
                        %key,
                        error = %e,
                        subscribers = partition.members(*key).len(),
                        "Generation failed, skipping its subscribers"
                    );
                }
            }
        }

        contents
    }

    async fn dispatch_all(
        &self,
        run_id: RunId,
        partition: &Partition,
        contents: &GeneratedContents,
    ) -> Vec<(usize, SubscriberOutcome)> {
        let jobs = partition.iter().map(|(key, member)| {
            let content = contents.get(&key).and_then(|result| result.as_ref().ok()).cloned();
            (key, member, content)
        });

        stream::iter(jobs)
            .map(|(key, member, content)| async move {
                let subscriber = &member.subscriber;

                let outcome = match content {
                    None => {
                        run_warn!(run_id, subscriber = subscriber.id, %key, "No content, skipped");
                        DispatchOutcome::SkippedNoContent
                    }
                    Some(body) => {
                        let delivery = async { self.dispatcher.send(subscriber, key, &body).await };
                        match AssertUnwindSafe(delivery).catch_unwind().await {
                            Ok(Ok(())) => {
                                run_debug!(run_id, subscriber = subscriber.id, %key, "Delivered");
                                DispatchOutcome::Sent
                            }
                            Ok(Err(e)) => {
                                run_warn!(run_id, subscriber = subscriber.id, error = %e, "Delivery failed");
                                DispatchOutcome::Failed(FailureReason::Delivery(e))
                            }
                            Err(panic) => {
                                let message = panic_message(panic.as_ref());
                                run_warn!(run_id, subscriber = subscriber.id, %message, "Delivery panicked");
                                DispatchOutcome::Failed(FailureReason::Panicked(message))
                            }
                        }
                    }
                };

                (
                    member.index,
                    SubscriberOutcome {
                        subscriber_id: subscriber.id,
                        recipient_id: subscriber.recipient_id.clone(),
                        key: Some(key),
                        outcome,
                    },
                )
            })
            .buffer_unordered(self.options.dispatch_concurrency.max(1))
            .collect()
            .await
    }
}
