//! Scripted stand-in for the remote weather service.
//!
//! Each query or location gets a delay and a canned reply. Delays use
//! `tokio::time::sleep`, so tests running with a paused clock decide exactly
//! when a "network call" completes.

#![allow(dead_code)]

use std::{collections::HashMap, sync::Mutex, time::Duration};

use async_trait::async_trait;
use citycast_core::{
    Condition, CurrentConditions, Fault, ForecastDay, Location, Weather, WeatherProvider,
};

type Script<T> = (Duration, Result<T, Fault>);

#[derive(Debug, Default)]
pub struct FakeProvider {
    searches: Mutex<HashMap<String, Script<Vec<Location>>>>,
    forecasts: Mutex<HashMap<String, Script<Weather>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn on_search(&self, query: &str, delay_ms: u64, reply: Result<Vec<Location>, Fault>) {
        self.searches
            .lock()
            .unwrap()
            .insert(query.to_string(), (Duration::from_millis(delay_ms), reply));
    }

    pub fn on_forecast(&self, location: &str, delay_ms: u64, reply: Result<Weather, Fault>) {
        self.forecasts
            .lock()
            .unwrap()
            .insert(location.to_string(), (Duration::from_millis(delay_ms), reply));
    }

    /// Every call made so far, as `search:<q>` or `forecast:<location>:<days>`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherProvider for FakeProvider {
    async fn search_locations(&self, query: &str) -> Result<Vec<Location>, Fault> {
        self.calls.lock().unwrap().push(format!("search:{query}"));
        let script = self.searches.lock().unwrap().get(query).cloned();
        let (delay, reply) = script.unwrap_or((Duration::ZERO, Ok(Vec::new())));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply
    }

    async fn get_forecast(&self, location: &str, days: u8) -> Result<Weather, Fault> {
        self.calls.lock().unwrap().push(format!("forecast:{location}:{days}"));
        let script = self.forecasts.lock().unwrap().get(location).cloned();
        let (delay, reply) =
            script.unwrap_or((Duration::ZERO, Err(Fault::Other(Some("unscripted".into())))));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}

pub fn location(id: i64, name: &str, country: &str) -> Location {
    Location { id, name: name.to_string(), country: country.to_string() }
}

pub fn bogota() -> Location {
    location(1, "Bogotá", "Colombia")
}

pub fn weather(label: &str, days: usize) -> Weather {
    let condition = Condition { text: "Sunny".into(), icon: "//cdn/113.png".into() };
    Weather {
        location_label: label.to_string(),
        current: CurrentConditions {
            temperature_c: 18.0,
            feels_like_c: 17.0,
            condition: condition.clone(),
            humidity_pct: 60,
            wind_kph: 8.0,
            pressure_mb: 1012.0,
        },
        forecast_days: (0..days)
            .map(|i| ForecastDay {
                date: format!("2024-01-{:02}", 15 + i),
                max_temp_c: 20.0,
                min_temp_c: 12.0,
                avg_temp_c: 16.0,
                condition: condition.clone(),
                avg_humidity_pct: 70,
            })
            .collect(),
    }
}

pub async fn advance_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
