//! Configuration management for the `TourGuide` service
//!
//! Handles loading configuration from an optional TOML file and
//! `TOURGUIDE_*` environment variable overrides, and validates all
//! settings before the service starts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::TourGuideError;

/// Root configuration structure for the `TourGuide` service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TourGuideConfig {
    /// Web server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Outbound HTTP client configuration
    #[serde(default)]
    pub http: HttpConfig,
    /// Geocoding (place verification) configuration
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Weather collaborator configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Attractions collaborator configuration
    #[serde(default)]
    pub attractions: AttractionsConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Optional model-based intent extraction configuration
    #[serde(default)]
    pub model: ModelConfig,
}

/// Web server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Outbound HTTP client settings shared by all collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header (Nominatim requires an identifying one)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Geocoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL for the Nominatim API
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
}

/// Weather collaborator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL for the Open-Meteo API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
}

/// Attractions collaborator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttractionsConfig {
    /// Base URL for the Overpass API
    #[serde(default = "default_attractions_base_url")]
    pub base_url: String,
    /// Maximum number of attractions per reply
    #[serde(default = "default_attraction_limit")]
    pub limit: usize,
    /// Search radius around the verified coordinates, in meters
    #[serde(default = "default_attraction_radius")]
    pub radius_meters: u32,
}

/// Cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
    /// TTL for cached geocoding lookups, in hours
    #[serde(default = "default_geocode_ttl")]
    pub geocode_ttl_hours: u32,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Model-based intent extraction settings (disabled by default)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Enable the model-based intent resolver and clarifier
    #[serde(default)]
    pub enabled: bool,
    /// Base URL of an OpenAI-compatible endpoint
    #[serde(default = "default_model_base_url")]
    pub base_url: String,
    /// Model identifier
    #[serde(default = "default_model_name")]
    pub model: String,
    /// API key, if the endpoint requires one
    pub api_key: Option<String>,
}

// Default value functions
fn default_port() -> u16 {
    5000
}

fn default_user_agent() -> String {
    format!("TourGuide/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> u32 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_attractions_base_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_attraction_limit() -> usize {
    5
}

fn default_attraction_radius() -> u32 {
    20_000
}

fn default_cache_location() -> String {
    "~/.cache/tourguide".to_string()
}

fn default_geocode_ttl() -> u32 {
    168
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_model_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model_name() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
        }
    }
}

impl Default for AttractionsConfig {
    fn default() -> Self {
        Self {
            base_url: default_attractions_base_url(),
            limit: default_attraction_limit(),
            radius_meters: default_attraction_radius(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            location: default_cache_location(),
            geocode_ttl_hours: default_geocode_ttl(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_model_base_url(),
            model: default_model_name(),
            api_key: None,
        }
    }
}

impl CacheConfig {
    /// Cache directory with `~/` expanded to the user's home directory.
    #[must_use]
    pub fn directory(&self) -> PathBuf {
        if let Some(rest) = self.location.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(&self.location)
    }
}

impl TourGuideConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment variable overrides with TOURGUIDE_ prefix,
        // e.g. TOURGUIDE_SERVER__PORT=8080
        builder = builder.add_source(
            Environment::with_prefix("TOURGUIDE")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: TourGuideConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tourguide").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_seconds == 0 {
            return Err(TourGuideError::config("HTTP timeout must be positive").into());
        }

        if self.http.timeout_seconds > 300 {
            return Err(TourGuideError::config("HTTP timeout cannot exceed 300 seconds").into());
        }

        if self.http.max_retries > 10 {
            return Err(TourGuideError::config("HTTP max retries cannot exceed 10").into());
        }

        if self.attractions.limit == 0 || self.attractions.limit > 50 {
            return Err(
                TourGuideError::config("Attraction limit must be between 1 and 50").into(),
            );
        }

        if self.attractions.radius_meters > 100_000 {
            return Err(
                TourGuideError::config("Attraction search radius cannot exceed 100 km").into(),
            );
        }

        if self.cache.geocode_ttl_hours > 720 {
            return Err(
                TourGuideError::config("Geocode TTL cannot exceed 720 hours (30 days)").into(),
            );
        }

        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TourGuideError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        for base_url in [
            &self.geocoding.base_url,
            &self.weather.base_url,
            &self.attractions.base_url,
            &self.model.base_url,
        ] {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(TourGuideError::config(format!(
                    "Base URL must be a valid HTTP or HTTPS URL, got '{base_url}'"
                ))
                .into());
            }
        }

        if self.model.enabled {
            if let Some(api_key) = &self.model.api_key {
                if api_key.is_empty() {
                    return Err(TourGuideError::config(
                        "Model API key cannot be empty if provided. Either remove it or provide a valid key.",
                    )
                    .into());
                }
            }
        }

        Ok(())
    }
}
