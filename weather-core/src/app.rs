//! Top-level UI controller.
//!
//! Owns the session state and sequences input → fetch → state update → map
//! sync. Fetches are split into [`WeatherApp::begin_fetch`],
//! [`PendingFetch::run`] and [`WeatherApp::apply`] so a front end can keep
//! accepting input while a request is in flight. Only the most recently
//! issued fetch may change state; older completions are dropped.

use std::fmt::Debug;

use tracing::{debug, info, warn};

use crate::{
    config::MapConfig,
    map::MapPresenter,
    model::{Location, WeatherReport, WeatherSnapshot},
    provider::{FetchFailure, WeatherProvider},
};

/// Blocking user-facing notification, e.g. a modal alert.
pub trait Notifier: Debug {
    fn notify(&self, message: &str);
}

/// Notifier that only logs.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        warn!(notification = message, "user notification");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// A fetch that has been issued but not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFetch {
    seq: u64,
    city: String,
}

impl PendingFetch {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// Perform the single network attempt.
    pub async fn run<P>(self, provider: &P) -> FetchCompletion
    where
        P: WeatherProvider + ?Sized,
    {
        let result = provider.fetch(&self.city).await;
        FetchCompletion { seq: self.seq, result }
    }
}

#[derive(Debug)]
pub struct FetchCompletion {
    seq: u64,
    result: Result<WeatherReport, FetchFailure>,
}

impl FetchCompletion {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// What applying a completion did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Updated,
    Failed,
    /// A newer fetch was issued after this one; nothing changed.
    Stale,
}

#[derive(Debug)]
pub struct WeatherApp<N: Notifier = LogNotifier> {
    city: String,
    weather: Option<WeatherSnapshot>,
    location: Option<Location>,
    theme: Theme,
    map: MapPresenter,
    notifier: N,
    last_issued: u64,
}

impl WeatherApp<LogNotifier> {
    pub fn new(map_config: MapConfig) -> Self {
        Self::with_notifier(map_config, LogNotifier)
    }
}

impl<N: Notifier> WeatherApp<N> {
    pub fn with_notifier(map_config: MapConfig, notifier: N) -> Self {
        Self {
            city: String::new(),
            weather: None,
            location: None,
            theme: Theme::default(),
            map: MapPresenter::new(map_config),
            notifier,
            last_issued: 0,
        }
    }

    pub fn set_city(&mut self, city: impl Into<String>) {
        self.city = city.into();
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        debug!(theme = self.theme.as_str(), "theme toggled");
        self.theme
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn weather(&self) -> Option<&WeatherSnapshot> {
        self.weather.as_ref()
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn map(&self) -> &MapPresenter {
        &self.map
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Issue a fetch for the current city input. The input is passed on unvalidated.
    pub fn begin_fetch(&mut self) -> PendingFetch {
        self.last_issued += 1;
        debug!(seq = self.last_issued, city = %self.city, "fetch issued");
        PendingFetch { seq: self.last_issued, city: self.city.clone() }
    }

    pub fn apply(&mut self, completion: FetchCompletion) -> FetchOutcome {
        if completion.seq != self.last_issued {
            debug!(seq = completion.seq, latest = self.last_issued, "dropping stale fetch result");
            return FetchOutcome::Stale;
        }

        match completion.result {
            Ok(report) => {
                info!(
                    city = %report.snapshot.city_name,
                    country = %report.snapshot.country_code,
                    "weather updated"
                );
                self.weather = Some(report.snapshot);
                self.set_location(report.location);
                FetchOutcome::Updated
            }
            Err(failure) => {
                warn!(error = %failure, "weather lookup failed");
                self.notifier.notify(failure.user_message());
                FetchOutcome::Failed
            }
        }
    }

    /// Begin, run and apply one fetch for the current city input.
    pub async fn search<P>(&mut self, provider: &P) -> FetchOutcome
    where
        P: WeatherProvider + ?Sized,
    {
        let pending = self.begin_fetch();
        let completion = pending.run(provider).await;
        self.apply(completion)
    }

    fn set_location(&mut self, location: Location) {
        self.location = Some(location);
        self.on_location_changed(location);
    }

    fn on_location_changed(&mut self, location: Location) {
        self.map.present(location);
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::HashMap};

    use async_trait::async_trait;
    use reqwest::StatusCode;

    use super::*;
    use crate::provider::FailureCause;

    #[derive(Debug, Default)]
    struct RecordingNotifier {
        messages: RefCell<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str) {
            self.messages.borrow_mut().push(message.to_string());
        }
    }

    #[derive(Debug, Default)]
    struct StubProvider {
        reports: HashMap<String, WeatherReport>,
    }

    impl StubProvider {
        fn with(mut self, report: WeatherReport) -> Self {
            self.reports.insert(report.snapshot.city_name.clone(), report);
            self
        }
    }

    #[async_trait]
    impl WeatherProvider for StubProvider {
        async fn fetch(&self, city: &str) -> Result<WeatherReport, FetchFailure> {
            self.reports.get(city).cloned().ok_or_else(|| {
                FetchFailure::new(
                    city,
                    FailureCause::Status { status: StatusCode::NOT_FOUND, body: String::new() },
                )
            })
        }
    }

    fn report(name: &str, country: &str, lat: f64, lon: f64) -> WeatherReport {
        WeatherReport {
            snapshot: WeatherSnapshot {
                city_name: name.to_string(),
                country_code: country.to_string(),
                temperature_c: 15.2,
                condition: "clear sky".to_string(),
                humidity_pct: 60,
                wind_speed_mps: 3.1,
                observed_at: None,
            },
            location: Location::new(lat, lon),
        }
    }

    fn app() -> WeatherApp<RecordingNotifier> {
        WeatherApp::with_notifier(MapConfig::default(), RecordingNotifier::default())
    }

    #[test]
    fn theme_toggles_back_and_forth() {
        let mut app = app();
        assert_eq!(app.theme(), Theme::Light);
        assert_eq!(app.toggle_theme(), Theme::Dark);
        assert_eq!(app.toggle_theme(), Theme::Light);
    }

    #[tokio::test]
    async fn successful_search_updates_weather_and_map() {
        let provider = StubProvider::default().with(report("London", "GB", 51.5, -0.12));
        let mut app = app();
        app.set_city("London");

        assert_eq!(app.search(&provider).await, FetchOutcome::Updated);

        assert_eq!(app.weather().expect("weather").city_name, "London");
        assert_eq!(app.location(), Some(Location::new(51.5, -0.12)));
        let canvas = app.map().canvas().expect("canvas");
        assert_eq!(canvas.markers().len(), 1);
        assert!(app.notifier().messages.borrow().is_empty());
    }

    #[tokio::test]
    async fn failed_search_notifies_and_keeps_previous_state() {
        let provider = StubProvider::default().with(report("London", "GB", 51.5, -0.12));
        let mut app = app();
        app.set_city("London");
        app.search(&provider).await;
        let canvas_id = app.map().canvas().expect("canvas").id();

        app.set_city("Zzzzznotacity");
        assert_eq!(app.search(&provider).await, FetchOutcome::Failed);

        assert_eq!(
            *app.notifier().messages.borrow(),
            vec!["City not found! Please try again.".to_string()]
        );
        assert_eq!(app.weather().expect("weather kept").city_name, "London");
        assert_eq!(app.location(), Some(Location::new(51.5, -0.12)));
        let canvas = app.map().canvas().expect("canvas kept");
        assert_eq!(canvas.id(), canvas_id);
        assert_eq!(canvas.center(), Location::new(51.5, -0.12));
    }

    #[tokio::test]
    async fn failure_before_any_success_renders_nothing() {
        let provider = StubProvider::default();
        let mut app = app();
        app.set_city("Zzzzznotacity");

        assert_eq!(app.search(&provider).await, FetchOutcome::Failed);
        assert!(app.weather().is_none());
        assert!(app.location().is_none());
        assert!(!app.map().is_initialized());
    }

    #[tokio::test]
    async fn stale_completion_is_dropped() {
        let provider = StubProvider::default()
            .with(report("London", "GB", 51.5, -0.12))
            .with(report("Paris", "FR", 48.8566, 2.3522));
        let mut app = app();

        app.set_city("London");
        let first = app.begin_fetch();
        app.set_city("Paris");
        let second = app.begin_fetch();

        let second_done = second.run(&provider).await;
        let first_done = first.run(&provider).await;

        assert_eq!(app.apply(second_done), FetchOutcome::Updated);
        assert_eq!(app.apply(first_done), FetchOutcome::Stale);
        assert_eq!(app.weather().expect("weather").city_name, "Paris");
        assert_eq!(app.map().canvas().expect("canvas").center(), Location::new(48.8566, 2.3522));
    }

    #[tokio::test]
    async fn stale_failure_does_not_notify() {
        let provider = StubProvider::default().with(report("Paris", "FR", 48.8566, 2.3522));
        let mut app = app();

        app.set_city("Nowhere");
        let first = app.begin_fetch();
        app.set_city("Paris");
        let second = app.begin_fetch();

        let first_done = first.run(&provider).await;
        assert_eq!(app.apply(first_done), FetchOutcome::Stale);
        assert!(app.notifier().messages.borrow().is_empty());

        assert_eq!(app.apply(second.run(&provider).await), FetchOutcome::Updated);
    }

    #[test]
    fn begin_fetch_issues_increasing_sequence_numbers() {
        let mut app = app();
        app.set_city("");

        let a = app.begin_fetch();
        let b = app.begin_fetch();
        assert!(b.seq() > a.seq());
        assert_eq!(b.city(), "");
    }
}
