use std::{sync::Arc, time::Duration};

use anyhow::Context;
use citycast_core::{
    Config, ForecastCoordinator, ForecastState, SearchCoordinator, SearchState, WeatherProvider,
    provider_from_config,
};
use clap::{Parser, Subcommand};
use inquire::{Confirm, InquireError, Password, PasswordDisplayMode, Select, Text};
use tokio::sync::watch;

use crate::render;

/// Extra time granted on top of debounce + timeout before giving up on a
/// state change that may have been coalesced.
const SETTLE_GRACE: Duration = Duration::from_millis(500);

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "City weather search and forecasts")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// weatherapi.com key; overrides the configured one.
    #[arg(long, global = true, env = "WEATHERAPI_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the weatherapi.com API key.
    Configure,

    /// Search for locations matching a query.
    Search {
        /// City name or partial name.
        query: String,
    },

    /// Show current weather and the short-term forecast for a location.
    Forecast {
        /// Location name, e.g. "Bogota".
        location: String,
    },

    /// Interactively search, pick a city and view its forecast.
    Browse,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Search { query } => {
                let config = Config::load()?;
                let provider = provider_from_config(&config, self.api_key.as_deref())?;
                search_once(provider, &config, &query).await
            }
            Command::Forecast { location } => {
                let config = Config::load()?;
                let provider = provider_from_config(&config, self.api_key.as_deref())?;
                forecast_once(provider, &config, &location, self.verbose).await
            }
            Command::Browse => {
                let config = Config::load()?;
                let provider = provider_from_config(&config, self.api_key.as_deref())?;
                browse(provider, &config, self.verbose).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("weatherapi.com API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!("Saved API key to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn search_once(
    provider: Arc<dyn WeatherProvider>,
    config: &Config,
    query: &str,
) -> anyhow::Result<()> {
    let search = SearchCoordinator::new(provider, config.search);
    let mut rx = search.subscribe();

    let before = rx.borrow_and_update().completed;
    search.on_query_changed(query);
    let state = settle_search(&mut rx, before, config).await?;

    if let Some(error) = state.error {
        anyhow::bail!("{error}");
    }
    render::print_locations(&state.results);
    Ok(())
}

async fn forecast_once(
    provider: Arc<dyn WeatherProvider>,
    config: &Config,
    location: &str,
    show_icons: bool,
) -> anyhow::Result<()> {
    let forecast = ForecastCoordinator::new(provider, config.forecast);
    let mut rx = forecast.subscribe();

    forecast.load(location);
    let state = settle_forecast(&mut rx, config).await?;

    if let Some(error) = state.error {
        anyhow::bail!("{error}");
    }
    if let Some(weather) = &state.weather {
        render::print_weather(weather, show_icons);
    }
    Ok(())
}

async fn browse(
    provider: Arc<dyn WeatherProvider>,
    config: &Config,
    show_icons: bool,
) -> anyhow::Result<()> {
    let search = SearchCoordinator::new(Arc::clone(&provider), config.search);
    let forecast = ForecastCoordinator::new(provider, config.forecast);
    let mut search_rx = search.subscribe();
    let mut forecast_rx = forecast.subscribe();

    loop {
        let query = match Text::new("Search city:").with_help_message("empty input quits").prompt()
        {
            Ok(query) => query,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };
        if query.trim().is_empty() {
            break;
        }

        let before = search_rx.borrow_and_update().completed;
        search.on_query_changed(&query);
        let state = settle_search(&mut search_rx, before, config).await?;
        if let Some(error) = state.error {
            eprintln!("{error}");
            continue;
        }
        if state.results.is_empty() {
            println!("No locations found.");
            continue;
        }

        let picked = match Select::new("Pick a location:", state.results).prompt() {
            Ok(picked) => picked,
            Err(InquireError::OperationCanceled) => continue,
            Err(InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };

        forecast.load(&picked.name);
        loop {
            let state = settle_forecast(&mut forecast_rx, config).await?;
            match (&state.error, &state.weather) {
                (Some(error), _) => eprintln!("{error}"),
                (None, Some(weather)) => render::print_weather(weather, show_icons),
                (None, None) => {}
            }

            let again = match Confirm::new("Refresh?").with_default(false).prompt() {
                Ok(again) => again,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => false,
                Err(err) => return Err(err.into()),
            };
            if !again {
                break;
            }
            forecast.refresh();
        }
    }

    Ok(())
}

/// Wait until the search started by the latest query has produced an outcome,
/// i.e. the completion count has moved past `before`.
///
/// After the worst-case latency the current state is taken as final.
async fn settle_search(
    rx: &mut watch::Receiver<SearchState>,
    before: u64,
    config: &Config,
) -> anyhow::Result<SearchState> {
    let limit = config.search.debounce() + config.search.timeout() + SETTLE_GRACE;

    let settled = tokio::time::timeout(limit, async {
        rx.wait_for(|state| !state.has_query() || state.completed != before)
            .await
            .map(|state| state.clone())
    })
    .await;

    match settled {
        Ok(state) => state.context("search coordinator went away"),
        Err(_) => Ok(rx.borrow().clone()),
    }
}

async fn settle_forecast(
    rx: &mut watch::Receiver<ForecastState>,
    config: &Config,
) -> anyhow::Result<ForecastState> {
    let limit = config.forecast.timeout() + SETTLE_GRACE;

    let settled = tokio::time::timeout(limit, async {
        rx.wait_for(ForecastState::is_settled).await.map(|state| state.clone())
    })
    .await;

    match settled {
        Ok(state) => state.context("forecast coordinator went away"),
        Err(_) => Ok(rx.borrow().clone()),
    }
}
