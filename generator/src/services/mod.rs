//! Generator services implementations

pub mod provider_client;

#[cfg(test)]
pub mod tests;

pub use provider_client::*;
