//! Orchestration scenarios driven through stub collaborators

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;

use tourguide::geocoding::PlaceVerifier;
use tourguide::intent::{Clarifier, Intent, IntentResolver};
use tourguide::models::{Coordinates, Role, Turn, WeatherFact};
use tourguide::orchestrator::ConversationOrchestrator;
use tourguide::places::AttractionProvider;
use tourguide::response;
use tourguide::weather::WeatherProvider;

struct StubVerifier {
    found: bool,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl PlaceVerifier for StubVerifier {
    async fn verify(&self, place: &str) -> Result<Option<Coordinates>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .found
            .then(|| Coordinates::new(35.6895, 139.6917, place.to_string())))
    }
}

struct StubWeather {
    temperature: Option<f64>,
    precipitation: u8,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl WeatherProvider for StubWeather {
    async fn fetch(&self, place: &str) -> Result<Option<WeatherFact>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(WeatherFact {
            timestamp: Utc::now(),
            temperature: self.temperature,
            precipitation_probability: self.precipitation,
            place: place.to_string(),
            display_name: place.to_string(),
        }))
    }
}

struct FailingWeather;

#[async_trait]
impl WeatherProvider for FailingWeather {
    async fn fetch(&self, _place: &str) -> Result<Option<WeatherFact>> {
        Err(anyhow!("weather service unreachable"))
    }
}

struct StubPlaces {
    attractions: Vec<String>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl AttractionProvider for StubPlaces {
    async fn fetch(&self, _place: &str, limit: usize) -> Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.attractions.iter().take(limit).cloned().collect())
    }
}

struct FailingResolver;

#[async_trait]
impl IntentResolver for FailingResolver {
    async fn resolve(&self, _utterance: &str, _history: &[Turn]) -> Result<Intent> {
        Err(anyhow!("model endpoint offline"))
    }
}

struct CannedClarifier(&'static str);

#[async_trait]
impl Clarifier for CannedClarifier {
    async fn respond(&self, _utterance: &str, _history: &[Turn]) -> Result<String> {
        Ok(self.0.to_string())
    }
}

struct FailingClarifier;

#[async_trait]
impl Clarifier for FailingClarifier {
    async fn respond(&self, _utterance: &str, _history: &[Turn]) -> Result<String> {
        Err(anyhow!("model endpoint offline"))
    }
}

fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

struct TestWiring {
    orchestrator: ConversationOrchestrator,
    verifier_calls: Arc<AtomicUsize>,
    weather_calls: Arc<AtomicUsize>,
    places_calls: Arc<AtomicUsize>,
}

fn wiring(found: bool, temperature: Option<f64>, attractions: &[&str]) -> TestWiring {
    let verifier_calls = counter();
    let weather_calls = counter();
    let places_calls = counter();

    let orchestrator = ConversationOrchestrator::new(
        Box::new(StubVerifier {
            found,
            calls: verifier_calls.clone(),
        }),
        Box::new(StubWeather {
            temperature,
            precipitation: 10,
            calls: weather_calls.clone(),
        }),
        Box::new(StubPlaces {
            attractions: attractions.iter().map(|s| (*s).to_string()).collect(),
            calls: places_calls.clone(),
        }),
    );

    TestWiring {
        orchestrator,
        verifier_calls,
        weather_calls,
        places_calls,
    }
}

#[tokio::test]
async fn weather_question_gets_the_weather_sentence() {
    let wiring = wiring(true, Some(22.0), &["Senso-ji"]);

    let (reply, history) = wiring
        .orchestrator
        .process("What's the weather in Tokyo?", Vec::new())
        .await;

    assert_eq!(
        reply,
        "In Tokyo it's currently 22°C with a chance of 10% to rain."
    );
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[0].content, "What's the weather in Tokyo?");
    assert_eq!(history[1].role, Role::Assistant);
    assert_eq!(history[1].content, reply);
    // Weather only: the attractions collaborator stays idle.
    assert_eq!(wiring.places_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn bare_trip_gets_the_planning_clarification() {
    let wiring = wiring(true, Some(22.0), &["Senso-ji"]);

    let (reply, history) = wiring.orchestrator.process("trip", Vec::new()).await;

    assert_eq!(reply, response::TRIP_PLANNING_CLARIFICATION);
    assert_eq!(history.len(), 2);
    assert_eq!(wiring.verifier_calls.load(Ordering::SeqCst), 0);
    assert_eq!(wiring.weather_calls.load(Ordering::SeqCst), 0);
    assert_eq!(wiring.places_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn duration_question_gets_the_duration_clarification() {
    let wiring = wiring(true, Some(22.0), &[]);

    let (reply, _) = wiring
        .orchestrator
        .process("how long should I stay?", Vec::new())
        .await;

    assert_eq!(reply, response::TRIP_DURATION_CLARIFICATION);
}

#[tokio::test]
async fn unclear_question_gets_the_generic_clarification() {
    let wiring = wiring(true, Some(22.0), &[]);

    let (reply, _) = wiring.orchestrator.process("hmm", Vec::new()).await;

    assert_eq!(reply, response::NO_PLACE_CLARIFICATION);
}

#[tokio::test]
async fn trip_planning_lists_attractions() {
    let wiring = wiring(true, Some(22.0), &["Colosseum", "Trevi Fountain"]);

    let (reply, _) = wiring
        .orchestrator
        .process("Plan a trip to Rome", Vec::new())
        .await;

    assert_eq!(
        reply,
        "In Rome these are the places you can go:\n- Colosseum\n- Trevi Fountain"
    );
    assert_eq!(wiring.weather_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_place_short_circuits_collaborators() {
    let wiring = wiring(false, Some(22.0), &["Colosseum"]);

    let (reply, history) = wiring
        .orchestrator
        .process("Weather and places in Atlantis", Vec::new())
        .await;

    assert_eq!(
        reply,
        "I don't know if Atlantis exists. Please check the spelling or try a different location."
    );
    assert_eq!(history.len(), 2);
    assert_eq!(wiring.verifier_calls.load(Ordering::SeqCst), 1);
    assert_eq!(wiring.weather_calls.load(Ordering::SeqCst), 0);
    assert_eq!(wiring.places_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn weather_and_places_join_with_the_connective() {
    let wiring = wiring(true, Some(22.0), &["Louvre", "Eiffel Tower"]);

    let (reply, _) = wiring
        .orchestrator
        .process("Weather and attractions in Paris", Vec::new())
        .await;

    assert_eq!(
        reply,
        "In Paris it's currently 22°C with a chance of 10% to rain. \
         And these are the places you can go:\n- Louvre\n- Eiffel Tower"
    );
    assert_eq!(reply.matches("these are the places you can go").count(), 1);
}

#[tokio::test]
async fn failed_weather_still_delivers_places() {
    let places_calls = counter();
    let orchestrator = ConversationOrchestrator::new(
        Box::new(StubVerifier {
            found: true,
            calls: counter(),
        }),
        Box::new(FailingWeather),
        Box::new(StubPlaces {
            attractions: vec!["Louvre".to_string()],
            calls: places_calls.clone(),
        }),
    );

    let (reply, _) = orchestrator
        .process("Weather and attractions in Paris", Vec::new())
        .await;

    // Partial failure drops the connective and joins with a blank line.
    assert_eq!(
        reply,
        "Unable to fetch weather information for Paris.\n\n\
         In Paris these are the places you can go:\n- Louvre"
    );
    assert_eq!(places_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_attraction_list_gets_the_substitute_sentence() {
    let wiring = wiring(true, Some(22.0), &[]);

    let (reply, _) = wiring
        .orchestrator
        .process("Plan a trip to Rome", Vec::new())
        .await;

    assert_eq!(reply, "Unable to find tourist attractions in Rome.");
}

#[tokio::test]
async fn statement_without_flags_defaults_to_attractions() {
    let wiring = wiring(true, Some(22.0), &["Pantheon"]);

    let (reply, _) = wiring
        .orchestrator
        .process("I am in Rome", Vec::new())
        .await;

    assert_eq!(reply, "In Rome these are the places you can go:\n- Pantheon");
    assert_eq!(wiring.weather_calls.load(Ordering::SeqCst), 0);
    assert_eq!(wiring.places_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_temperature_renders_na() {
    let wiring = wiring(true, None, &[]);

    let (reply, _) = wiring
        .orchestrator
        .process("weather in Oslo", Vec::new())
        .await;

    assert_eq!(
        reply,
        "In Oslo it's currently N/A°C with a chance of 10% to rain."
    );
}

#[tokio::test]
async fn every_exchange_appends_exactly_two_turns() {
    let wiring = wiring(true, Some(22.0), &["Senso-ji"]);

    let mut history = Vec::new();
    for (i, utterance) in ["weather in Tokyo", "trip", "Weather and places in Paris"]
        .iter()
        .enumerate()
    {
        let previous = history.clone();
        let (_, updated) = wiring.orchestrator.process(utterance, history).await;
        assert_eq!(updated.len(), (i + 1) * 2);
        // Append-only: the earlier turns are untouched.
        assert_eq!(&updated[..previous.len()], &previous[..]);
        history = updated;
    }
}

#[tokio::test]
async fn failing_resolver_falls_back_to_pattern_rules() {
    let wiring = wiring(true, Some(22.0), &[]);
    let orchestrator = wiring
        .orchestrator
        .with_resolver(Box::new(FailingResolver));

    let (reply, _) = orchestrator
        .process("What's the weather in Tokyo?", Vec::new())
        .await;

    assert_eq!(
        reply,
        "In Tokyo it's currently 22°C with a chance of 10% to rain."
    );
}

#[tokio::test]
async fn configured_clarifier_answers_verbatim() {
    let wiring = wiring(true, Some(22.0), &[]);
    let orchestrator = wiring
        .orchestrator
        .with_clarifier(Box::new(CannedClarifier("Which city are you curious about?")));

    let (reply, _) = orchestrator.process("hmm", Vec::new()).await;

    assert_eq!(reply, "Which city are you curious about?");
}

#[tokio::test]
async fn failing_clarifier_falls_back_to_the_ladder() {
    let wiring = wiring(true, Some(22.0), &[]);
    let orchestrator = wiring
        .orchestrator
        .with_clarifier(Box::new(FailingClarifier));

    let (reply, _) = orchestrator
        .process("how long should I stay?", Vec::new())
        .await;

    assert_eq!(reply, response::TRIP_DURATION_CLARIFICATION);
}

#[tokio::test]
async fn attraction_limit_caps_the_listing() {
    let wiring = wiring(
        true,
        Some(22.0),
        &["One", "Two", "Three", "Four", "Five", "Six", "Seven"],
    );
    let orchestrator = wiring.orchestrator.with_attraction_limit(3);

    let (reply, _) = orchestrator
        .process("Plan a trip to Rome", Vec::new())
        .await;

    assert_eq!(
        reply,
        "In Rome these are the places you can go:\n- One\n- Two\n- Three"
    );
}
