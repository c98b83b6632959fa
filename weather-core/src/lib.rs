//! Core library for the `weather` lookup.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather provider abstraction and its OpenWeather client
//! - A headless map presenter (lazy canvas, single marker)
//! - The UI controller that ties fetches to map updates, and its text view
//!
//! It is used by `weather-cli`, but can also drive other front ends.

pub mod app;
pub mod config;
pub mod map;
pub mod model;
pub mod provider;
pub mod view;

pub use app::{FetchOutcome, LogNotifier, Notifier, PendingFetch, Theme, WeatherApp};
pub use config::{Config, ConfigError, MapConfig};
pub use map::{MapCanvas, MapPresenter};
pub use model::{Location, TileCoord, WeatherReport, WeatherSnapshot};
pub use provider::{FetchFailure, OpenWeatherProvider, WeatherProvider, provider_from_config};
