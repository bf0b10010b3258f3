//! `TourGuide` - multi-agent travel assistant
//!
//! This library routes free-text travel questions to geocoding, weather,
//! and attraction collaborators and composes a single natural-language
//! reply, optionally carrying multi-turn conversation context.

use std::time::Duration;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod intent;
pub mod models;
pub mod orchestrator;
pub mod places;
pub mod response;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::TourGuideConfig;
pub use error::TourGuideError;
pub use intent::{Intent, IntentResolver, PatternResolver};
pub use models::{Coordinates, Role, Turn, WeatherFact};
pub use orchestrator::ConversationOrchestrator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TourGuideError>;

/// HTTP client shared by all collaborators: bounded timeout, identifying
/// User-Agent, retries with exponential backoff.
pub(crate) fn api_client(http: &config::HttpConfig) -> anyhow::Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(http.timeout_seconds.into()))
        .user_agent(http.user_agent.as_str())
        .build()?;

    let retries = ExponentialBackoff::builder().build_with_max_retries(http.max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retries))
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_api_client_builds_from_defaults() {
        let http = config::HttpConfig::default();
        assert!(api_client(&http).is_ok());
    }
}
