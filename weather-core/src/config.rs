use std::{fs, path::{Path, PathBuf}};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding the OpenWeather API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_TILE_URL_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const DEFAULT_TILE_ATTRIBUTION: &str = "© OpenStreetMap contributors";
/// Deepest zoom OpenStreetMap serves tiles for.
pub const MAX_ZOOM: u8 = 19;
pub const DEFAULT_MARKER_ICON_URL: &str =
    "https://upload.wikimedia.org/wikipedia/commons/e/ec/RedDot.svg";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine platform config directory")]
    NoConfigDir,

    #[error("Failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse config file {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },

    #[error("Failed to serialize configuration to TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write config file {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(
        "No OpenWeather API key configured.\n\
         Hint: export OPENWEATHER_API_KEY=<key> or run `weather configure`."
    )]
    MissingApiKey,
}

/// Map canvas settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Zoom applied once when the canvas is created.
    pub default_zoom: u8,
    /// Raster tile URL with `{z}`, `{x}` and `{y}` placeholders.
    pub tile_url_template: String,
    pub tile_attribution: String,
    pub marker_icon_url: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_zoom: 10,
            tile_url_template: DEFAULT_TILE_URL_TEMPLATE.to_string(),
            tile_attribution: DEFAULT_TILE_ATTRIBUTION.to_string(),
            marker_icon_url: DEFAULT_MARKER_ICON_URL.to_string(),
        }
    }
}

impl MapConfig {
    /// The configured zoom, capped at [`MAX_ZOOM`].
    pub fn zoom(&self) -> u8 {
        self.default_zoom.min(MAX_ZOOM)
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// timeout_secs = 10
///
/// [map]
/// default_zoom = 12
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fallback API key, used when the environment does not provide one.
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub map: MapConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            map: MapConfig::default(),
        }
    }
}

impl Config {
    /// Load config from the platform location, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            // First run: no config file, use defaults.
            tracing::debug!(path = %path.display(), "config file absent, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

        let mut cfg: Config = toml::from_str(&contents)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;

        if cfg.map.default_zoom > MAX_ZOOM {
            tracing::warn!(
                zoom = cfg.map.default_zoom,
                max = MAX_ZOOM,
                "map zoom out of range, clamping"
            );
            cfg.map.default_zoom = cfg.map.zoom();
        }

        Ok(cfg)
    }

    /// Save config to the platform location, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| ConfigError::Write { path: parent.to_path_buf(), source })?;
        }

        let toml = toml::to_string_pretty(self)?;

        fs::write(path, toml).map_err(|source| ConfigError::Write { path: path.to_path_buf(), source })
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or(ConfigError::NoConfigDir)?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Read the API key from the process environment, falling back to the file.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        self.api_key_with_env(std::env::var(API_KEY_ENV).ok())
    }

    /// Key precedence: a non-blank environment value wins over the config file.
    pub fn api_key_with_env(&self, env_value: Option<String>) -> Result<String, ConfigError> {
        env_value
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|key| !key.trim().is_empty()))
            .ok_or(ConfigError::MissingApiKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_openweather_and_osm() {
        let cfg = Config::default();

        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.map.default_zoom, 10);
        assert!(cfg.map.tile_url_template.contains("{z}/{x}/{y}"));
    }

    #[test]
    fn env_key_overrides_file_key() {
        let cfg = Config { api_key: Some("FILE_KEY".into()), ..Config::default() };

        let key = cfg.api_key_with_env(Some("ENV_KEY".into())).expect("key must resolve");
        assert_eq!(key, "ENV_KEY");
    }

    #[test]
    fn blank_env_key_falls_back_to_file() {
        let cfg = Config { api_key: Some("FILE_KEY".into()), ..Config::default() };

        let key = cfg.api_key_with_env(Some("   ".into())).expect("key must resolve");
        assert_eq!(key, "FILE_KEY");
    }

    #[test]
    fn missing_key_errors_with_hint() {
        let err = Config::default().api_key_with_env(None).unwrap_err();

        assert!(matches!(err, ConfigError::MissingApiKey));
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn load_from_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from(&dir.path().join("nope.toml")).expect("defaults");

        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config { api_key: Some("KEY".into()), timeout_secs: 5, ..Config::default() };
        cfg.map.default_zoom = 12;
        cfg.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[map]\ndefault_zoom = 7\n").expect("write");

        let cfg = Config::load_from(&path).expect("load");
        assert_eq!(cfg.map.default_zoom, 7);
        assert_eq!(cfg.map.marker_icon_url, DEFAULT_MARKER_ICON_URL);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.api_key, None);
    }

    #[test]
    fn out_of_range_zoom_is_clamped_on_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[map]\ndefault_zoom = 40\n").expect("write");

        let cfg = Config::load_from(&path).expect("load");
        assert_eq!(cfg.map.default_zoom, MAX_ZOOM);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "timeout_secs = \"soon\"").expect("write");

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
