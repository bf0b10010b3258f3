//! Current-weather collaborator backed by the Open-Meteo forecast API

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::config::TourGuideConfig;
use crate::geocoding::NominatimClient;
use crate::models::WeatherFact;

/// Produces current weather facts for a place name, or `None` when the
/// place or its weather cannot be determined.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch(&self, place: &str) -> Result<Option<WeatherFact>>;
}

pub struct OpenMeteoWeather {
    client: ClientWithMiddleware,
    base_url: String,
    geocoder: NominatimClient,
}

impl OpenMeteoWeather {
    pub fn new(config: &TourGuideConfig, geocoder: NominatimClient) -> Result<Self> {
        Ok(Self {
            client: crate::api_client(&config.http)?,
            base_url: config.weather.base_url.clone(),
            geocoder,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoWeather {
    #[instrument(skip(self))]
    async fn fetch(&self, place: &str) -> Result<Option<WeatherFact>> {
        let Some(coordinates) = self.geocoder.lookup(place).await? else {
            return Ok(None);
        };

        let url = format!(
            "{}/forecast?latitude={}&longitude={}&current=temperature_2m,precipitation_probability&timezone=auto",
            self.base_url, coordinates.latitude, coordinates.longitude
        );

        let response = self.client.get(url).send().await?;
        let forecast: ForecastResponse = response
            .json()
            .await
            .context("Failed to parse Open-Meteo response")?;

        let Some(current) = forecast.current else {
            warn!("No current weather block for '{place}'");
            return Ok(None);
        };

        Ok(Some(WeatherFact {
            timestamp: Utc::now(),
            temperature: current.temperature_2m,
            precipitation_probability: current.precipitation_probability.unwrap_or(0),
            place: place.to_string(),
            display_name: coordinates.display_name,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentConditions>,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temperature_2m: Option<f64>,
    precipitation_probability: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forecast_response() {
        let body = r#"{"current": {"temperature_2m": 22.0, "precipitation_probability": 10}}"#;
        let forecast: ForecastResponse = serde_json::from_str(body).unwrap();
        let current = forecast.current.unwrap();

        assert_eq!(current.temperature_2m, Some(22.0));
        assert_eq!(current.precipitation_probability, Some(10));
    }

    #[test]
    fn test_parse_forecast_response_with_nulls() {
        let body = r#"{"current": {"temperature_2m": null, "precipitation_probability": null}}"#;
        let forecast: ForecastResponse = serde_json::from_str(body).unwrap();
        let current = forecast.current.unwrap();

        assert!(current.temperature_2m.is_none());
        assert!(current.precipitation_probability.is_none());
    }

    #[test]
    fn test_parse_forecast_response_without_current_block() {
        let forecast: ForecastResponse = serde_json::from_str("{}").unwrap();
        assert!(forecast.current.is_none());
    }
}
