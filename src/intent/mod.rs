//! Query intent resolution
//!
//! Determines what a user utterance asks for: a candidate place name plus
//! whether weather and/or attractions are wanted. The heuristic resolver
//! is always available; a model-based one can be layered on top and falls
//! back to the heuristic on any failure.

pub mod llm;
pub mod patterns;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::Turn;

/// Keywords that flag a weather request
const WEATHER_KEYWORDS: &[&str] = &[
    "weather",
    "temperature",
    "temp",
    "climate",
    "forecast",
    "hot",
    "cold",
    "rain",
];

/// Keywords that flag an attractions request
const PLACES_KEYWORDS: &[&str] = &[
    "place",
    "places",
    "attraction",
    "attractions",
    "visit",
    "see",
    "tourist",
    "tourism",
    "plan",
    "trip",
    "things to do",
    "sightseeing",
];

/// Structured extraction of one utterance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intent {
    /// Candidate place name, title-cased
    pub place: Option<String>,
    /// Whether weather information was requested
    pub needs_weather: bool,
    /// Whether attractions were requested
    pub needs_places: bool,
}

impl Intent {
    /// True iff a non-empty place candidate was produced.
    #[must_use]
    pub fn place_exists(&self) -> bool {
        self.place.as_deref().is_some_and(|place| !place.is_empty())
    }
}

/// Flags whether weather and/or attractions are requested.
///
/// Plain substring membership over the lowercased text; a keyword trips
/// its flag in any context, negated or not.
#[must_use]
pub fn classify(text: &str) -> (bool, bool) {
    let lower = text.to_lowercase();
    let needs_weather = WEATHER_KEYWORDS.iter().any(|keyword| lower.contains(keyword));
    let needs_places = PLACES_KEYWORDS.iter().any(|keyword| lower.contains(keyword));
    (needs_weather, needs_places)
}

/// Turns an utterance (plus the conversation so far) into an [`Intent`].
///
/// The history ends with the user turn currently being interpreted.
#[async_trait]
pub trait IntentResolver: Send + Sync {
    async fn resolve(&self, utterance: &str, history: &[Turn]) -> Result<Intent>;
}

/// Asks one short question when no destination could be determined.
#[async_trait]
pub trait Clarifier: Send + Sync {
    async fn respond(&self, utterance: &str, history: &[Turn]) -> Result<String>;
}

/// Heuristic resolver: regex place extraction plus keyword classification.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternResolver;

impl PatternResolver {
    /// Infallible extraction used both directly and as the fallback path.
    #[must_use]
    pub fn extract(&self, utterance: &str) -> Intent {
        let (needs_weather, needs_places) = classify(utterance);
        Intent {
            place: patterns::extract_place(utterance),
            needs_weather,
            needs_places,
        }
    }
}

#[async_trait]
impl IntentResolver for PatternResolver {
    async fn resolve(&self, utterance: &str, _history: &[Turn]) -> Result<Intent> {
        Ok(self.extract(utterance))
    }
}
