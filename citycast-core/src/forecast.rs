//! Forecast retrieval for the details view.

use std::{sync::Arc, time::Duration};

use tokio::sync::watch;

use crate::{
    ErrorCategory, ForecastSettings, Weather, WeatherProvider,
    pipeline::{TaskSlot, bounded},
    state::{StateCell, Ticket},
};

const FORECAST_FALLBACK: &str = "Failed to load the forecast";

/// Published state of one details-view visit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastState {
    /// Target of the last `load`, reused by `refresh`.
    pub location: String,
    pub weather: Option<Weather>,
    pub is_loading: bool,
    pub error: Option<ErrorCategory>,
}

impl ForecastState {
    /// True once the latest attempt finished, successfully or not.
    pub fn is_settled(&self) -> bool {
        !self.is_loading && (self.weather.is_some() || self.error.is_some())
    }
}

#[derive(Debug)]
pub struct ForecastCoordinator {
    provider: Arc<dyn WeatherProvider>,
    settings: ForecastSettings,
    state: Arc<StateCell<ForecastState>>,
    task: TaskSlot,
}

impl ForecastCoordinator {
    pub fn new(provider: Arc<dyn WeatherProvider>, settings: ForecastSettings) -> Self {
        Self {
            provider,
            settings,
            state: Arc::new(StateCell::default()),
            task: TaskSlot::default(),
        }
    }

    pub fn state(&self) -> ForecastState {
        self.state.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<ForecastState> {
        self.state.subscribe()
    }

    /// Fetch the forecast for `location_name` immediately.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime with a non-blank name.
    pub fn load(&self, location_name: &str) {
        tracing::debug!(location = location_name, "loading weather forecast");
        self.task.cancel();

        if location_name.trim().is_empty() {
            tracing::warn!("invalid location name: blank");
            self.state.begin(|state| {
                state.location = location_name.to_string();
                state.error = Some(ErrorCategory::InvalidLocation);
                state.is_loading = false;
            });
            return;
        }

        let ticket = self.state.begin(|state| {
            state.location = location_name.to_string();
            state.weather = None;
            state.is_loading = true;
            state.error = None;
        });

        let provider = Arc::clone(&self.provider);
        let state = Arc::clone(&self.state);
        let location = location_name.to_string();
        let days = self.settings.days;
        let timeout = self.settings.timeout();

        let handle = tokio::spawn(async move {
            run_forecast(provider.as_ref(), &state, ticket, &location, days, timeout).await;
        });
        self.task.replace(handle);
    }

    /// Reload the last requested location. Does nothing if there is none.
    pub fn refresh(&self) {
        let location = self.state.current().location;
        if location.trim().is_empty() {
            tracing::warn!("cannot refresh: location name is blank");
            return;
        }

        tracing::debug!(location = %location, "refreshing weather forecast");
        self.load(&location);
    }
}

async fn run_forecast(
    provider: &dyn WeatherProvider,
    state: &StateCell<ForecastState>,
    ticket: Ticket,
    location: &str,
    days: u8,
    timeout: Duration,
) {
    let outcome = bounded(timeout, FORECAST_FALLBACK, provider.get_forecast(location, days)).await;

    match &outcome {
        Ok(weather) => tracing::info!(
            location,
            days = weather.forecast_days.len(),
            "weather forecast loaded"
        ),
        Err(category) => tracing::warn!(location, error = %category, "weather forecast failed"),
    }

    let applied = state.publish(ticket, |state| {
        state.is_loading = false;
        match outcome {
            Ok(weather) => {
                state.weather = Some(weather);
                state.error = None;
            }
            Err(category) => {
                state.weather = None;
                state.error = Some(category);
            }
        }
    });
    if !applied {
        tracing::debug!(location, "discarding result of superseded forecast load");
    }
}
