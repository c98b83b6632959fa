use std::f64::consts::PI;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the spherical mercator projection (EPSG:3857).
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude bound of the square web mercator world.
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

/// Deepest zoom whose tile count per axis fits in a `u32`.
const MAX_TILE_ZOOM: u8 = 31;

/// A point on Earth in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Project to spherical mercator metres `(x, y)`, the coordinate space
    /// tile sources use for view centers.
    pub fn to_web_mercator(self) -> (f64, f64) {
        let lat = self.latitude.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
        let x = EARTH_RADIUS_M * self.longitude.to_radians();
        let y = EARTH_RADIUS_M * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
        (x, y)
    }

    /// Slippy-map tile containing this location at `zoom`, capped at zoom 31.
    pub fn tile_at(self, zoom: u8) -> TileCoord {
        let zoom = zoom.min(MAX_TILE_ZOOM);
        let n = f64::from(1u32 << zoom);
        let lat = self.latitude.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
        let lon = self.longitude.clamp(-180.0, 180.0);

        let x = ((lon + 180.0) / 360.0 * n).floor();
        let y = ((1.0 - lat.tan().asinh() / PI) / 2.0 * n).floor();

        let max = n - 1.0;
        TileCoord { x: x.clamp(0.0, max) as u32, y: y.clamp(0.0, max) as u32, z: zoom }
    }

    /// Approximate equality in degrees, for comparing re-centered views.
    pub fn approx_eq(&self, other: &Location, epsilon: f64) -> bool {
        (self.latitude - other.latitude).abs() <= epsilon
            && (self.longitude - other.longitude).abs() <= epsilon
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Index of one raster tile in the `{z}/{x}/{y}` scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

/// Current conditions for one city, held only for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city_name: String,
    pub country_code: String,
    pub temperature_c: f64,
    pub condition: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub observed_at: Option<DateTime<Utc>>,
}

/// Result of one successful lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub snapshot: WeatherSnapshot,
    pub location: Location,
}
