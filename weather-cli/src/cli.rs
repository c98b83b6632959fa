use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{CustomType, InquireError, Password, Text, validator::Validation};
use tracing::{debug, info};
use weather_core::{
    Config, FetchOutcome, Notifier, OpenWeatherProvider, WeatherApp, config::MAX_ZOOM,
    provider_from_config, view,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather lookup with a map marker")]
pub struct Cli {
    /// Read configuration from this file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively edit and save the configuration file.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, passed to the provider as typed.
        city: String,
    },

    /// Prompt for cities until you quit (`:theme` toggles the theme, `:quit` exits).
    Interactive,
}

/// Prints notifications to stderr, the terminal's stand-in for a modal alert.
#[derive(Debug)]
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str) {
        eprintln!("⚠️  {message}");
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = self.load_config()?;
        info!(command = ?self.command, "running command");

        match self.command {
            Command::Configure => configure(config, self.config),
            Command::Show { city } => show(&config, city).await,
            Command::Interactive => interactive(&config).await,
        }
    }

    fn load_config(&self) -> Result<Config> {
        let config = match &self.config {
            Some(path) => {
                debug!(path = %path.display(), "loading configuration from --config");
                Config::load_from(path)
            }
            None => {
                debug!("loading configuration from the platform config directory");
                Config::load()
            }
        };
        config.context("Failed to load configuration")
    }
}

fn provider(config: &Config) -> Result<OpenWeatherProvider> {
    provider_from_config(config).context("Cannot create weather provider")
}

async fn show(config: &Config, city: String) -> Result<()> {
    let provider = provider(config)?;
    let mut app = WeatherApp::with_notifier(config.map.clone(), TerminalNotifier);

    app.set_city(city);
    match app.search(&provider).await {
        FetchOutcome::Updated => {
            println!("{}", view::render_app(&app));
            Ok(())
        }
        _ => bail!("lookup for '{}' failed", app.city()),
    }
}

async fn interactive(config: &Config) -> Result<()> {
    let provider = provider(config)?;
    let mut app = WeatherApp::with_notifier(config.map.clone(), TerminalNotifier);

    loop {
        let input = match Text::new("City:").with_placeholder("Enter city name").prompt() {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        };

        match input.trim() {
            ":quit" | ":q" => break,
            ":theme" => {
                let theme = app.toggle_theme();
                debug!(theme = theme.as_str(), "theme switched from prompt");
            }
            _ => {
                // Free text goes to the provider untouched.
                app.set_city(input);
                app.search(&provider).await;
            }
        }

        println!("{}\n", view::render_app(&app));
    }

    Ok(())
}

fn configure(mut config: Config, path: Option<PathBuf>) -> Result<()> {
    let api_key = Password::new("OpenWeather API key (leave empty to keep current):")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.api_key = Some(api_key.trim().to_string());
    }

    let base_url = Text::new("Provider base URL:")
        .with_default(&config.base_url)
        .prompt()
        .context("Failed to read base URL")?;
    config.base_url = base_url;

    config.timeout_secs = CustomType::<u64>::new("Request timeout (seconds):")
        .with_default(config.timeout_secs)
        .prompt()
        .context("Failed to read timeout")?;

    config.map.default_zoom = CustomType::<u8>::new(&format!("Map zoom (0-{MAX_ZOOM}):"))
        .with_default(config.map.zoom())
        .with_validator(validate_zoom)
        .prompt()
        .context("Failed to read zoom")?;

    let tile_url_template = Text::new("Tile URL template:")
        .with_default(&config.map.tile_url_template)
        .prompt()
        .context("Failed to read tile URL template")?;
    config.map.tile_url_template = tile_url_template;

    let saved_to = match path {
        Some(path) => {
            config.save_to(&path).context("Failed to save configuration")?;
            path
        }
        None => config.save().context("Failed to save configuration")?,
    };

    info!(path = %saved_to.display(), "configuration saved");
    println!("Configuration saved to {}", saved_to.display());
    Ok(())
}

fn validate_zoom(zoom: &u8) -> Result<Validation, inquire::CustomUserError> {
    if *zoom <= MAX_ZOOM {
        Ok(Validation::Valid)
    } else {
        Ok(Validation::Invalid(format!("Zoom must be between 0 and {MAX_ZOOM}").into()))
    }
}
