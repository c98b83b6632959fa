use async_trait::async_trait;
use reqwest::StatusCode;
use std::fmt::Debug;
use thiserror::Error;

use crate::{Config, WeatherReport, config::ConfigError};

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Message shown to the user for every failed lookup.
pub const NOT_FOUND_MESSAGE: &str = "City not found! Please try again.";

/// Why a lookup failed. Kept for logs only; callers treat every cause alike.
#[derive(Debug, Error)]
pub enum FailureCause {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider answered {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// The single failure kind of a weather lookup.
#[derive(Debug, Error)]
#[error("lookup for '{city}' failed: {cause}")]
pub struct FetchFailure {
    pub city: String,
    #[source]
    pub cause: FailureCause,
}

impl FetchFailure {
    pub fn new(city: impl Into<String>, cause: impl Into<FailureCause>) -> Self {
        Self { city: city.into(), cause: cause.into() }
    }

    /// What the user is told, regardless of cause.
    pub fn user_message(&self) -> &'static str {
        NOT_FOUND_MESSAGE
    }
}

/// Fetches current conditions for a free-text city name.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, city: &str) -> Result<WeatherReport, FetchFailure>;
}

/// Construct the OpenWeather provider from config, resolving the API key
/// from the environment first.
pub fn provider_from_config(config: &Config) -> Result<OpenWeatherProvider, ConfigError> {
    let api_key = config.resolve_api_key()?;
    OpenWeatherProvider::from_config(api_key, config)
}
