use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use tourguide::config::TourGuideConfig;
use tourguide::error::TourGuideError;
use tourguide::geocoding::NominatimClient;
use tourguide::intent::llm::{ModelClarifier, ModelClient, ModelResolver};
use tourguide::orchestrator::ConversationOrchestrator;
use tourguide::places::OverpassPlaces;
use tourguide::weather::OpenMeteoWeather;
use tourguide::{cache, web};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        let message = error
            .downcast_ref::<TourGuideError>()
            .map_or_else(|| format!("{error:#}"), TourGuideError::user_message);
        eprintln!("Error: {message}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = TourGuideConfig::load()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    cache::init(config.cache.directory())?;

    let geocoder = NominatimClient::new(&config)?;
    let weather = OpenMeteoWeather::new(&config, geocoder.clone())?;
    let places = OverpassPlaces::new(&config, geocoder.clone())?;

    let mut orchestrator = ConversationOrchestrator::new(
        Box::new(geocoder),
        Box::new(weather),
        Box::new(places),
    )
    .with_attraction_limit(config.attractions.limit);

    if config.model.enabled {
        let client = ModelClient::new(&config)?;
        orchestrator = orchestrator
            .with_resolver(Box::new(ModelResolver::new(client.clone())))
            .with_clarifier(Box::new(ModelClarifier::new(client)));
        tracing::info!("Model-based intent extraction enabled ({})", config.model.model);
    }

    web::run(config.server.port, Arc::new(orchestrator)).await
}
