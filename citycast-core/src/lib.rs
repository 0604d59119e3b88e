//! Core library for the `citycast` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weatherapi.com provider and the fault vocabulary it reports
//! - Shared domain models (locations, current conditions, forecast days)
//! - The search and forecast coordinators: debounced, cancellable,
//!   timeout-bounded attempts that publish observable state
//!
//! Front ends only read coordinator state; they never see transport errors,
//! just an [`ErrorCategory`].

pub mod classify;
pub mod config;
pub mod fault;
pub mod forecast;
pub mod model;
mod pipeline;
pub mod provider;
pub mod search;
pub mod state;

pub use classify::{ErrorCategory, classify};
pub use config::{Config, ForecastSettings, SearchSettings};
pub use fault::Fault;
pub use forecast::{ForecastCoordinator, ForecastState};
pub use model::{Condition, CurrentConditions, ForecastDay, Location, Weather};
pub use provider::{WeatherProvider, provider_from_config, weatherapi::WeatherApiProvider};
pub use search::{SearchCoordinator, SearchState};
pub use state::StateCell;
