//! Conversation orchestration
//!
//! Sequences intent resolution, place verification, and collaborator
//! calls for one utterance, and composes the reply. All state travels in
//! the history the caller passes in and gets back; the orchestrator
//! itself only holds its wiring.

use tracing::{debug, instrument, warn};

use crate::geocoding::PlaceVerifier;
use crate::intent::{Clarifier, Intent, IntentResolver, PatternResolver};
use crate::models::Turn;
use crate::places::AttractionProvider;
use crate::response;
use crate::weather::WeatherProvider;

/// Length-of-stay wording that gets the trip-duration clarification
const DURATION_KEYWORDS: &[&str] = &["how many days", "how long", "duration", "stay"];

/// General trip wording that gets the trip-planning clarification
const TRIP_KEYWORDS: &[&str] = &["trip", "travel", "vacation", "holiday", "tour"];

pub struct ConversationOrchestrator {
    resolver: Box<dyn IntentResolver>,
    heuristic: PatternResolver,
    clarifier: Option<Box<dyn Clarifier>>,
    verifier: Box<dyn PlaceVerifier>,
    weather: Box<dyn WeatherProvider>,
    places: Box<dyn AttractionProvider>,
    attraction_limit: usize,
}

impl ConversationOrchestrator {
    #[must_use]
    pub fn new(
        verifier: Box<dyn PlaceVerifier>,
        weather: Box<dyn WeatherProvider>,
        places: Box<dyn AttractionProvider>,
    ) -> Self {
        Self {
            resolver: Box::new(PatternResolver),
            heuristic: PatternResolver,
            clarifier: None,
            verifier,
            weather,
            places,
            attraction_limit: 5,
        }
    }

    /// Replace the heuristic intent resolver, usually with a model-based
    /// one. Resolver failures still land on the pattern rules.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Box<dyn IntentResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Add a clarifier consulted before the canned clarification ladder.
    #[must_use]
    pub fn with_clarifier(mut self, clarifier: Box<dyn Clarifier>) -> Self {
        self.clarifier = Some(clarifier);
        self
    }

    #[must_use]
    pub fn with_attraction_limit(mut self, limit: usize) -> Self {
        self.attraction_limit = limit;
        self
    }

    /// Interprets one utterance and appends both sides of the exchange to
    /// the history. Never fails: every problem downgrades to an
    /// apologetic reply.
    #[instrument(skip(self, history), fields(turns = history.len()))]
    pub async fn process(&self, utterance: &str, mut history: Vec<Turn>) -> (String, Vec<Turn>) {
        history.push(Turn::user(utterance));

        let intent = self.resolve_intent(utterance, &history).await;
        debug!(?intent, "Resolved intent");

        let reply = match intent.place.as_deref().filter(|place| !place.is_empty()) {
            Some(place) => self.answer(place, &intent).await,
            None => self.clarify(utterance, &history).await,
        };

        history.push(Turn::assistant(reply.clone()));
        (reply, history)
    }

    async fn resolve_intent(&self, utterance: &str, history: &[Turn]) -> Intent {
        match self.resolver.resolve(utterance, history).await {
            Ok(intent) => intent,
            Err(error) => {
                warn!("Intent resolver failed, using pattern rules: {error:#}");
                self.heuristic.extract(utterance)
            }
        }
    }

    /// The no-place clarification ladder: configured clarifier first,
    /// then canned replies keyed on duration and trip wording.
    async fn clarify(&self, utterance: &str, history: &[Turn]) -> String {
        if let Some(clarifier) = &self.clarifier {
            match clarifier.respond(utterance, history).await {
                Ok(reply) => return reply,
                Err(error) => warn!("Clarifier failed, using canned replies: {error:#}"),
            }
        }

        let lower = utterance.to_lowercase();
        if DURATION_KEYWORDS.iter().any(|keyword| lower.contains(keyword)) {
            response::TRIP_DURATION_CLARIFICATION.to_string()
        } else if TRIP_KEYWORDS.iter().any(|keyword| lower.contains(keyword)) {
            response::TRIP_PLANNING_CLARIFICATION.to_string()
        } else {
            response::NO_PLACE_CLARIFICATION.to_string()
        }
    }

    async fn answer(&self, place: &str, intent: &Intent) -> String {
        let verified = match self.verifier.verify(place).await {
            Ok(coordinates) => coordinates,
            Err(error) => {
                warn!("Place verification failed for '{place}': {error:#}");
                None
            }
        };
        let Some(coordinates) = verified else {
            return response::unknown_place(place);
        };
        debug!(
            "Verified '{place}' as {} ({})",
            coordinates.display_name,
            coordinates.format_coordinates()
        );

        let mut fragments = Vec::new();
        let mut weather_ok = false;
        let mut places_ok = false;

        if intent.needs_weather {
            match self.weather.fetch(place).await {
                Ok(Some(fact)) => {
                    weather_ok = true;
                    fragments.push(response::weather_reply(&fact));
                }
                Ok(None) => fragments.push(response::no_weather(place)),
                Err(error) => {
                    warn!("Weather lookup failed for '{place}': {error:#}");
                    fragments.push(response::no_weather(place));
                }
            }
        }

        // Attractions when asked for, and as the trip-planning default
        // when neither flag is set.
        if intent.needs_places || !intent.needs_weather {
            match self.places.fetch(place, self.attraction_limit).await {
                Ok(attractions) if !attractions.is_empty() => {
                    places_ok = true;
                    fragments.push(response::places_reply(place, &attractions));
                }
                Ok(_) => fragments.push(response::no_attractions(place)),
                Err(error) => {
                    warn!("Attraction lookup failed for '{place}': {error:#}");
                    fragments.push(response::no_attractions(place));
                }
            }
        }

        let use_connective =
            intent.needs_weather && intent.needs_places && weather_ok && places_ok;
        response::compose(&fragments, use_connective)
    }
}
