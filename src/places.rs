//! Tourist-attraction collaborator backed by the Overpass API
//!
//! Over-fetches three times the wanted count, then deduplicates by
//! case-insensitive name and truncates, keeping the provider's
//! notability order.

use std::collections::HashSet;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::instrument;

use crate::config::TourGuideConfig;
use crate::geocoding::NominatimClient;

/// Produces ranked attraction names for a place, most notable first, at
/// most `limit` entries. An empty list means nothing was found.
#[async_trait]
pub trait AttractionProvider: Send + Sync {
    async fn fetch(&self, place: &str, limit: usize) -> Result<Vec<String>>;
}

pub struct OverpassPlaces {
    client: ClientWithMiddleware,
    base_url: String,
    radius_meters: u32,
    geocoder: NominatimClient,
}

impl OverpassPlaces {
    pub fn new(config: &TourGuideConfig, geocoder: NominatimClient) -> Result<Self> {
        Ok(Self {
            client: crate::api_client(&config.http)?,
            base_url: config.attractions.base_url.clone(),
            radius_meters: config.attractions.radius_meters,
            geocoder,
        })
    }
}

#[async_trait]
impl AttractionProvider for OverpassPlaces {
    #[instrument(skip(self))]
    async fn fetch(&self, place: &str, limit: usize) -> Result<Vec<String>> {
        let Some(coordinates) = self.geocoder.lookup(place).await? else {
            return Ok(Vec::new());
        };

        let query = attraction_query(
            coordinates.latitude,
            coordinates.longitude,
            self.radius_meters,
            limit * 3,
        );

        let response = self.client.post(&self.base_url).body(query).send().await?;
        let data: OverpassResponse = response
            .json()
            .await
            .context("Failed to parse Overpass response")?;

        Ok(named_attractions(data.elements, limit))
    }
}

/// Overpass QL for tourism, historic, and park features around a point.
fn attraction_query(latitude: f64, longitude: f64, radius_meters: u32, fetch_count: usize) -> String {
    format!(
        "[out:json];\n\
         (\n\
           node[\"tourism\"](around:{radius_meters},{latitude},{longitude});\n\
           way[\"tourism\"](around:{radius_meters},{latitude},{longitude});\n\
           node[\"historic\"](around:{radius_meters},{latitude},{longitude});\n\
           way[\"historic\"](around:{radius_meters},{latitude},{longitude});\n\
           node[\"leisure\"=\"park\"](around:{radius_meters},{latitude},{longitude});\n\
           way[\"leisure\"=\"park\"](around:{radius_meters},{latitude},{longitude});\n\
         );\n\
         out body {fetch_count};"
    )
}

/// Named elements in arrival order, case-insensitively deduplicated,
/// truncated to `limit`.
fn named_attractions(elements: Vec<Element>, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for element in elements {
        let Some(name) = element.tags.name else {
            continue;
        };
        if seen.insert(name.to_lowercase()) {
            names.push(name);
            if names.len() >= limit {
                break;
            }
        }
    }

    names
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
struct Element {
    #[serde(default)]
    tags: Tags,
}

#[derive(Debug, Default, Deserialize)]
struct Tags {
    name: Option<String>,
}
