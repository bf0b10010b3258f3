//! Place verification via the Nominatim geocoding API
//!
//! A place name resolves to coordinates or it does not exist as far as
//! the orchestrator is concerned. Successful lookups are cached with a
//! jittered TTL; geocoding results move slowly.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::RngExt;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::cache;
use crate::config::TourGuideConfig;
use crate::models::Coordinates;

/// Confirms that a candidate place name resolves to real-world
/// coordinates. `Ok(None)` means "treat the name as non-existent".
#[async_trait]
pub trait PlaceVerifier: Send + Sync {
    async fn verify(&self, place: &str) -> Result<Option<Coordinates>>;
}

#[derive(Clone)]
pub struct NominatimClient {
    client: ClientWithMiddleware,
    base_url: String,
    ttl_hours: u32,
}

impl NominatimClient {
    pub fn new(config: &TourGuideConfig) -> Result<Self> {
        Ok(Self {
            client: crate::api_client(&config.http)?,
            base_url: config.geocoding.base_url.clone(),
            ttl_hours: config.cache.geocode_ttl_hours,
        })
    }

    #[instrument(skip(self))]
    pub async fn lookup(&self, place: &str) -> Result<Option<Coordinates>> {
        let key = format!("geocode:{}", place.to_lowercase());

        if let Some(cached) = cache::get::<Coordinates>(&key).await? {
            return Ok(Some(cached));
        }

        let Some(coordinates) = self.lookup_call(place).await? else {
            return Ok(None);
        };

        let jitter: f32 = rand::rng().random_range(0.9..1.1);
        cache::put(
            &key,
            coordinates.clone(),
            Duration::from_hours((self.ttl_hours as f32 * jitter) as u64),
        )
        .await?;
        Ok(Some(coordinates))
    }

    async fn lookup_call(&self, place: &str) -> Result<Option<Coordinates>> {
        debug!("Calling the geocoding API");
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(place)
        );

        let response = self.client.get(url).send().await?;
        let results: Vec<NominatimResult> = response
            .json()
            .await
            .context("Failed to parse Nominatim response")?;

        let Some(first) = results.into_iter().next() else {
            debug!("No geocoding results for '{place}'");
            return Ok(None);
        };

        Ok(Some(first.into_coordinates(place)?))
    }
}

#[async_trait]
impl PlaceVerifier for NominatimClient {
    async fn verify(&self, place: &str) -> Result<Option<Coordinates>> {
        self.lookup(place).await
    }
}

/// Nominatim serializes coordinates as strings
#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

impl NominatimResult {
    fn into_coordinates(self, place: &str) -> Result<Coordinates> {
        Ok(Coordinates {
            latitude: self
                .lat
                .parse()
                .with_context(|| format!("Invalid latitude: {}", self.lat))?,
            longitude: self
                .lon
                .parse()
                .with_context(|| format!("Invalid longitude: {}", self.lon))?,
            display_name: self.display_name.unwrap_or_else(|| place.to_string()),
        })
    }
}
