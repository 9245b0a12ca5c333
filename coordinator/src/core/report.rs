//! Per-run outcome bookkeeping

use std::fmt;

use chrono::{DateTime, Utc};
use generator::GenerationError;
use shared::{GenerationKey, RunId, SharedError, UnreadableRow};
use crate::error::DeliveryError;

/// Why a subscriber ended in `Failed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Delivery(DeliveryError),
    InvalidPreferences(Vec<SharedError>),
    MissingRecipient,
    Panicked(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Delivery(e) => write!(f, "{e}"),
            FailureReason::InvalidPreferences(issues) => {
                let issues: Vec<String> = issues.iter().map(ToString::to_string).collect();
                write!(f, "invalid preferences: {}", issues.join("; "))
            }
            FailureReason::MissingRecipient => write!(f, "no recipient id"),
            FailureReason::Panicked(message) => write!(f, "dispatch panicked: {message}"),
        }
    }
}

/// Terminal state of one subscriber in one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    SkippedNoContent,
    Failed(FailureReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberOutcome {
    pub subscriber_id: i64,
    pub recipient_id: String,
    /// `None` when the subscriber never reached a key
    pub key: Option<GenerationKey>,
    pub outcome: DispatchOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    NoSubscribers,
    NoMatchingSubscriber { target: String },
}

/// Everything a run did, in directory order
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: RunStatus,
    pub requested_keys: Vec<GenerationKey>,
    pub generated_keys: Vec<GenerationKey>,
    pub failed_keys: Vec<(GenerationKey, GenerationError)>,
    pub generator_calls: usize,
    pub outcomes: Vec<SubscriberOutcome>,
    /// Directory rows skipped because they could not be read as subscribers
    pub unreadable_rows: Vec<UnreadableRow>,
}

impl RunReport {
    /// A run that stopped before partitioning
    pub fn empty(run_id: RunId, started_at: DateTime<Utc>, status: RunStatus) -> Self {
        Self {
            run_id,
            started_at,
            finished_at: Utc::now(),
            status,
            requested_keys: Vec::new(),
            generated_keys: Vec::new(),
            failed_keys: Vec::new(),
            generator_calls: 0,
            outcomes: Vec::new(),
            unreadable_rows: Vec::new(),
        }
    }

    pub fn sent(&self) -> usize {
        self.count(|outcome| matches!(outcome, DispatchOutcome::Sent))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, DispatchOutcome::SkippedNoContent))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, DispatchOutcome::Failed(_)))
    }

    pub fn outcome_for(&self, recipient_id: &str) -> Option<&DispatchOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.recipient_id == recipient_id)
            .map(|o| &o.outcome)
    }

    /// Directory rows that never became subscribers
    pub fn unreadable(&self) -> usize {
        self.unreadable_rows.len()
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    fn count(&self, predicate: impl Fn(&DispatchOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(&o.outcome)).count()
    }
}

/// One-line summary for the end-of-run log
impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            RunStatus::NoSubscribers => write!(f, "no subscribers registered")?,
            RunStatus::NoMatchingSubscriber { target } => write!(f, "no subscriber matches '{target}'")?,
            RunStatus::Completed => {
                let generated: Vec<String> = self.generated_keys.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "generated [{}] ({} of {} keys), sent {}, skipped {}, failed {}",
                    generated.join(", "),
                    self.generated_keys.len(),
                    self.requested_keys.len(),
                    self.sent(),
                    self.skipped(),
                    self.failed(),
                )?;
            }
        }

        if !self.unreadable_rows.is_empty() {
            write!(f, ", unreadable rows {}", self.unreadable_rows.len())?;
        }
        Ok(())
    }
}
