//! Plain-text rendering of the controller state.

use crate::{
    app::{Notifier, WeatherApp},
    map::MapCanvas,
    model::WeatherSnapshot,
};

pub const TITLE: &str = "Weather App";

/// Lines of the weather panel, in display order.
pub fn render_weather(weather: &WeatherSnapshot) -> Vec<String> {
    let heading = if weather.country_code.is_empty() {
        weather.city_name.clone()
    } else {
        format!("{}, {}", weather.city_name, weather.country_code)
    };

    let mut lines = vec![
        heading,
        format!("Temperature: {}°C", weather.temperature_c),
        weather.condition.clone(),
        format!("Humidity: {}%", weather.humidity_pct),
        format!("Wind Speed: {} m/s", weather.wind_speed_mps),
    ];

    if let Some(observed) = weather.observed_at {
        lines.push(format!("Observed: {}", observed.format("%Y-%m-%d %H:%M UTC")));
    }

    lines
}

pub fn render_map(canvas: &MapCanvas) -> Vec<String> {
    vec![
        format!("Map centered on {} (zoom {})", canvas.center(), canvas.zoom()),
        format!("Markers: {}", canvas.markers().len()),
        format!("Tile: {}", canvas.center_tile_url()),
        canvas.base_layer().attribution.clone(),
    ]
}

/// Full screen: title and theme, then the weather and map panels when present.
pub fn render_app<N: Notifier>(app: &WeatherApp<N>) -> String {
    let mut lines = vec![format!("{TITLE} [{} mode]", app.theme().as_str())];

    if let Some(weather) = app.weather() {
        lines.push(String::new());
        lines.extend(render_weather(weather));
    }

    if let Some(canvas) = app.map().canvas() {
        lines.push(String::new());
        lines.extend(render_map(canvas));
    }

    lines.join("\n")
}
