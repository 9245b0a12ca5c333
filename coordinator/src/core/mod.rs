//! Run bookkeeping, subscriber grouping and message hand-off

pub mod dispatcher;
pub mod partition;
pub mod report;

pub use dispatcher::Dispatcher;
pub use partition::{Member, Partition, Rejected};
pub use report::{DispatchOutcome, FailureReason, RunReport, RunStatus, SubscriberOutcome};
