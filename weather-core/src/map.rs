//! Headless model of the map widget.
//!
//! The canvas is created on the first [`MapPresenter::present`] call and then
//! mutated in place; a front end draws it from the accessors.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use crate::{
    config::MapConfig,
    model::{Location, TileCoord},
};

static NEXT_CANVAS_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a canvas instance. Two canvases never share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanvasId(u64);

impl CanvasId {
    fn next() -> Self {
        Self(NEXT_CANVAS_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Raster base layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
}

impl TileLayer {
    pub fn tile_url(&self, tile: TileCoord) -> String {
        self.url_template
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub icon_url: String,
    /// Fraction of the icon size; `[0.5, 1.0]` pins the bottom center.
    pub anchor: [f64; 2],
    pub scale: f64,
}

impl MarkerStyle {
    pub fn pin(icon_url: impl Into<String>) -> Self {
        Self { icon_url: icon_url.into(), anchor: [0.5, 1.0], scale: 0.5 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: Location,
    pub style: MarkerStyle,
}

#[derive(Debug, Default)]
pub struct MarkerLayer {
    markers: Vec<Marker>,
}

impl MarkerLayer {
    pub fn clear(&mut self) {
        self.markers.clear();
    }

    pub fn add(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

#[derive(Debug)]
pub struct MapCanvas {
    id: CanvasId,
    center: Location,
    zoom: u8,
    base: TileLayer,
    markers: MarkerLayer,
}

impl MapCanvas {
    fn new(center: Location, config: &MapConfig) -> Self {
        Self {
            id: CanvasId::next(),
            center,
            zoom: config.zoom(),
            base: TileLayer {
                url_template: config.tile_url_template.clone(),
                attribution: config.tile_attribution.clone(),
            },
            markers: MarkerLayer::default(),
        }
    }

    pub fn id(&self) -> CanvasId {
        self.id
    }

    pub fn center(&self) -> Location {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn base_layer(&self) -> &TileLayer {
        &self.base
    }

    pub fn markers(&self) -> &[Marker] {
        self.markers.markers()
    }

    pub fn center_tile(&self) -> TileCoord {
        self.center.tile_at(self.zoom)
    }

    pub fn center_tile_url(&self) -> String {
        self.base.tile_url(self.center_tile())
    }
}

/// Keeps one canvas per session and a single marker on it.
#[derive(Debug)]
pub struct MapPresenter {
    config: MapConfig,
    canvas: Option<MapCanvas>,
}

impl MapPresenter {
    pub fn new(config: MapConfig) -> Self {
        Self { config, canvas: None }
    }

    /// Show `location`: create the canvas if needed, replace the marker and
    /// re-center. Zoom is fixed at creation.
    pub fn present(&mut self, location: Location) {
        let config = &self.config;
        let canvas = self.canvas.get_or_insert_with(|| {
            let canvas = MapCanvas::new(location, config);
            info!(canvas = ?canvas.id, zoom = canvas.zoom, "created map canvas");
            canvas
        });

        canvas.markers.clear();
        canvas.markers.add(Marker {
            position: location,
            style: MarkerStyle::pin(config.marker_icon_url.as_str()),
        });
        canvas.center = location;

        debug!(%location, "map re-centered");
    }

    pub fn canvas(&self) -> Option<&MapCanvas> {
        self.canvas.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.canvas.is_some()
    }
}

impl Default for MapPresenter {
    fn default() -> Self {
        Self::new(MapConfig::default())
    }
}
