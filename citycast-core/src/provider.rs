use crate::{Config, Fault, Location, Weather, provider::weatherapi::WeatherApiProvider};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod weatherapi;

/// Remote weather service used by the coordinators.
///
/// Implementations own their credentials and report failures as [`Fault`]s.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn search_locations(&self, query: &str) -> Result<Vec<Location>, Fault>;

    async fn get_forecast(&self, location: &str, days: u8) -> Result<Weather, Fault>;
}

/// Construct the weatherapi.com provider from config.
///
/// `api_key_override` (flag or environment) wins over the stored key.
pub fn provider_from_config(
    config: &Config,
    api_key_override: Option<&str>,
) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = api_key_override.or(config.api_key.as_deref()).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for weatherapi.com.\n\
                 Hint: run `citycast configure` or set WEATHERAPI_KEY."
        )
    })?;

    let provider = match config.base_url.as_deref() {
        Some(base_url) => WeatherApiProvider::with_base_url(api_key.to_owned(), base_url),
        None => WeatherApiProvider::new(api_key.to_owned()),
    };

    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg, None).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No API key configured"));
        assert!(msg.contains("Hint: run `citycast configure`"));
    }

    #[test]
    fn provider_from_config_uses_stored_key() {
        let cfg = Config { api_key: Some("KEY".into()), ..Config::default() };
        assert!(provider_from_config(&cfg, None).is_ok());
    }

    #[test]
    fn override_key_is_enough() {
        let cfg = Config::default();
        assert!(provider_from_config(&cfg, Some("FROM_ENV")).is_ok());
    }
}
