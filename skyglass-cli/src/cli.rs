use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use skyglass_core::{
    Config, Coordinates, FixedLocation, LocationError, LocationProvider, Locator, NoLocation,
    SearchHistory, WeatherClient,
};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyglass", version, about = "Current weather and forecast from OpenWeather")]
pub struct Cli {
    /// Number of daily summaries to keep (overrides the config file).
    #[arg(long, global = true)]
    pub days: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Show current weather and forecast for a city.
    Show {
        /// City name, e.g. "London" or "New York".
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },

    /// Show weather for a latitude/longitude pair.
    Coords {
        #[arg(long, allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Show weather for this device's configured location.
    Here,

    /// List place names matching a partial city name.
    Suggest {
        /// At least three characters.
        partial: String,
    },

    /// Search repeatedly, keeping a list of recent searches.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(Config::stored()?),
            Command::Show { city } => {
                let client = WeatherClient::new(&load_config(self.days)?)?;
                let report = client.report_by_city(&city.join(" ")).await?;
                output::print_report(&report);
                Ok(())
            }
            Command::Coords { lat, lon } => {
                let coords = Coordinates::from_parts(lat, lon)?;
                let client = WeatherClient::new(&load_config(self.days)?)?;
                let report = client.report_by_coords(coords).await?;
                output::print_report(&report);
                Ok(())
            }
            Command::Here => {
                let config = load_config(self.days)?;
                let coords = match config.location {
                    Some(coords) => locate(FixedLocation(Some(coords))).await?,
                    None => locate(NoLocation).await?,
                };
                let client = WeatherClient::new(&config)?;
                let report = client.report_by_coords(coords).await?;
                output::print_report(&report);
                Ok(())
            }
            Command::Suggest { partial } => {
                let client = WeatherClient::new(&load_config(self.days)?)?;
                output::print_suggestions(&client.suggest_cities(&partial).await);
                Ok(())
            }
            Command::Interactive => {
                let client = WeatherClient::new(&load_config(self.days)?)?;
                interactive(&client).await
            }
        }
    }
}

/// Stored config plus environment, with the `--days` override applied.
fn load_config(days: Option<usize>) -> Result<Config> {
    let mut config = Config::load()?;
    if let Some(days) = days {
        config.forecast_days = days;
    }
    tracing::debug!(
        forecast_days = config.forecast_days,
        key_configured = config.is_api_key_configured(),
        "configuration loaded"
    );
    Ok(config)
}

fn configure(mut config: Config) -> Result<()> {
    let key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.api_key = Some(key.trim().to_string());
    if !config.is_api_key_configured() {
        anyhow::bail!("That does not look like a usable API key.");
    }

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

async fn locate<P: LocationProvider>(provider: P) -> Result<Coordinates, LocationError> {
    Locator::new(provider).locate().await
}

const HELP: &str = "blank: recent searches, name?: suggestions, :clear: forget history, :q: quit";

async fn interactive(client: &WeatherClient) -> Result<()> {
    let mut history = SearchHistory::new();

    loop {
        let input = match Text::new("City:").with_help_message(HELP).prompt() {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        match input.trim() {
            ":q" => break,
            ":clear" => {
                history.clear();
                println!("Search history cleared.");
            }
            "" => {
                if history.is_empty() {
                    println!("No recent searches.");
                    continue;
                }
                if let Some(city) = pick("Recent searches:", history.list().to_vec())? {
                    search(client, &mut history, &city).await;
                }
            }
            partial if partial.ends_with('?') => {
                let suggestions = client.suggest_cities(partial.trim_end_matches('?')).await;
                if suggestions.is_empty() {
                    println!("No suggestions.");
                    continue;
                }
                if let Some(city) = pick("Did you mean:", suggestions)? {
                    search(client, &mut history, &city).await;
                }
            }
            city => search(client, &mut history, city).await,
        }
    }

    Ok(())
}

fn pick(prompt: &str, options: Vec<String>) -> Result<Option<String>> {
    Select::new(prompt, options)
        .prompt_skippable()
        .context("Failed to read selection")
}

/// Only successful searches are remembered.
async fn search(client: &WeatherClient, history: &mut SearchHistory, city: &str) {
    match client.report_by_city(city).await {
        Ok(report) => {
            output::print_report(&report);
            history.add(city);
        }
        Err(e) => eprintln!("{e}"),
    }
}
