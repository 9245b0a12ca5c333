//! Shared types for the daily learning dispatch system
//!
//! Holds the subscriber data model, the closed language/difficulty enumerations
//! with their fallback rules, and the logging helpers used by every crate.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
