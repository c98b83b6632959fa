use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::{
    Config,
    config::ConfigError,
    model::{Location, WeatherReport, WeatherSnapshot},
    provider::{FailureCause, FetchFailure},
};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn from_config(api_key: String, config: &Config) -> Result<Self, ConfigError> {
        let http = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn fetch_current(&self, city: &str) -> Result<WeatherReport, FailureCause> {
        let url = format!("{}/weather", self.base_url);
        debug!(%url, "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FailureCause::Status { status, body: truncate_body(&body) });
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;
        Ok(parsed.into_report())
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    coord: OwCoord,
    name: String,
    #[serde(default)]
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    dt: Option<i64>,
}

impl OwCurrentResponse {
    fn into_report(self) -> WeatherReport {
        let condition = self
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .unwrap_or_else(|| "Unknown".to_string());

        WeatherReport {
            snapshot: WeatherSnapshot {
                city_name: self.name,
                country_code: self.sys.country,
                temperature_c: self.main.temp,
                condition,
                humidity_pct: self.main.humidity,
                wind_speed_mps: self.wind.speed,
                observed_at: self.dt.and_then(unix_to_utc),
            },
            location: Location::new(self.coord.lat, self.coord.lon),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self), fields(provider = "openweather"))]
    async fn fetch(&self, city: &str) -> Result<WeatherReport, FetchFailure> {
        self.fetch_current(city).await.map_err(|cause| {
            warn!(%cause, "weather lookup failed");
            FetchFailure::new(city, cause)
        })
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
