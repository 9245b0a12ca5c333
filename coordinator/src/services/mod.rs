//! Production implementations of the coordinator's external collaborators

pub mod directory;
pub mod slack;

#[cfg(test)]
pub mod tests;

pub use directory::{FileDirectory, PostgrestDirectory};
pub use slack::SlackMessenger;
