use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{
    Fault,
    model::{Condition, CurrentConditions, ForecastDay, Location, Weather},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self { api_key, base_url: base_url.trim_end_matches('/').to_string(), http: Client::new() }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, Fault> {
        let url = format!("{}/{endpoint}", self.base_url);
        tracing::debug!(%url, "weatherapi request");

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await.map_err(Fault::from_body_read)?;

        if !status.is_success() {
            return Err(Fault::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| Fault::Decode(format!("{endpoint}: {e}")))
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn search_locations(&self, query: &str) -> Result<Vec<Location>, Fault> {
        let found: Vec<WaSearchLocation> = self.get_json("search.json", &[("q", query)]).await?;
        Ok(found.into_iter().map(Location::from).collect())
    }

    async fn get_forecast(&self, location: &str, days: u8) -> Result<Weather, Fault> {
        let days = days.to_string();
        let parsed: WaForecastResponse =
            self.get_json("forecast.json", &[("q", location), ("days", days.as_str())]).await?;
        Ok(Weather::from(parsed))
    }
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct WaSearchLocation {
    id: i64,
    name: String,
    region: String,
    country: String,
    lat: f64,
    lon: f64,
    url: String,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct WaLocation {
    name: String,
    region: String,
    country: String,
    lat: f64,
    lon: f64,
    tz_id: String,
    localtime: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    feelslike_c: f64,
    humidity: u8,
    wind_kph: f64,
    pressure_mb: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    maxtemp_c: f64,
    mintemp_c: f64,
    avgtemp_c: f64,
    avghumidity: u8,
    condition: WaCondition,
}

// Parsed but not surfaced in the domain model.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct WaAstro {
    sunrise: String,
    sunset: String,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct WaForecastDay {
    date: String,
    day: WaDay,
    astro: WaAstro,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    location: WaLocation,
    current: WaCurrent,
    forecast: WaForecast,
}

/// weatherapi.com error body: `{"error": {"code": 1006, "message": "..."}}`.
#[derive(Debug, Deserialize)]
struct WaErrorBody {
    error: WaErrorDetail,
}

#[derive(Debug, Deserialize)]
struct WaErrorDetail {
    message: String,
}

impl From<WaSearchLocation> for Location {
    fn from(wire: WaSearchLocation) -> Self {
        Location { id: wire.id, name: wire.name, country: wire.country }
    }
}

impl From<WaCondition> for Condition {
    fn from(wire: WaCondition) -> Self {
        Condition { text: wire.text, icon: wire.icon }
    }
}

impl From<WaCurrent> for CurrentConditions {
    fn from(wire: WaCurrent) -> Self {
        CurrentConditions {
            temperature_c: wire.temp_c,
            feels_like_c: wire.feelslike_c,
            condition: wire.condition.into(),
            humidity_pct: wire.humidity,
            wind_kph: wire.wind_kph,
            pressure_mb: wire.pressure_mb,
        }
    }
}

impl From<WaForecastDay> for ForecastDay {
    fn from(wire: WaForecastDay) -> Self {
        ForecastDay {
            date: wire.date,
            max_temp_c: wire.day.maxtemp_c,
            min_temp_c: wire.day.mintemp_c,
            avg_temp_c: wire.day.avgtemp_c,
            condition: wire.day.condition.into(),
            avg_humidity_pct: wire.day.avghumidity,
        }
    }
}

impl From<WaForecastResponse> for Weather {
    fn from(wire: WaForecastResponse) -> Self {
        Weather {
            location_label: format!("{}, {}", wire.location.name, wire.location.country),
            current: wire.current.into(),
            forecast_days: wire.forecast.forecastday.into_iter().map(ForecastDay::from).collect(),
        }
    }
}

/// Prefer the provider's own error message; fall back to the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<WaErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => truncate_body(body),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
