//! Daily learning-content dispatch
//!
//! Loads the subscriber set, groups it by (language, difficulty), generates
//! each group's content once, and delivers it to every member. A failure for
//! one key or one subscriber is recorded in the run report and never stops
//! the rest of the run.

pub mod config;
pub mod coordinator;
pub mod core;
pub mod error;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use crate::config::{DirectorySettings, DirectorySource, DispatchConfig, PreferencePolicy, RunOptions};
pub use crate::coordinator::RunCoordinator;
pub use crate::core::{DispatchOutcome, FailureReason, Partition, RunReport, RunStatus, SubscriberOutcome};
pub use error::{CoordinatorError, CoordinatorResult, DeliveryError};
pub use traits::{DirectoryClient, Messenger};
