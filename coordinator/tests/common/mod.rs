//! Common test utilities and infrastructure
//!
//! Shared fixtures, test doubles and a builder used across the coordinator
//! test suites.

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items for convenience
pub use fixtures::TestFixtures;
pub use helpers::{CoordinatorBuilder, RecordingMessenger, ScriptedGenerator, TestCoordinator};
