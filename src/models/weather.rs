//! Current-weather facts produced by the weather collaborator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One current-weather observation for a verified place.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WeatherFact {
    /// When this observation was fetched
    pub timestamp: DateTime<Utc>,
    /// Temperature in Celsius, absent when the provider had no reading
    pub temperature: Option<f64>,
    /// Chance of rain in percent (0-100)
    pub precipitation_probability: u8,
    /// Place name as the user asked for it
    pub place: String,
    /// Resolved display label from place verification
    pub display_name: String,
}

impl WeatherFact {
    /// Temperature for reply templates; `N/A` when no reading exists.
    #[must_use]
    pub fn format_temperature(&self) -> String {
        match self.temperature {
            Some(celsius) => format!("{celsius}"),
            None => "N/A".to_string(),
        }
    }
}
