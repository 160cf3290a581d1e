use crate::{
    Config, CurrentConditions, ForecastEntry, Query, WeatherError,
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of current conditions and the per-day forecast.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn current(&self, query: &Query) -> Result<CurrentConditions, WeatherError>;

    /// Forecast already collapsed to at most five calendar days.
    async fn forecast(&self, query: &Query) -> Result<Vec<ForecastEntry>, WeatherError>;
}

/// Construct the OpenWeather client from config.
pub fn client_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: run `kiwi configure` or set {}.",
            crate::config::API_KEY_ENV
        )
    })?;

    let client = match config.base_url.as_deref() {
        Some(base) => OpenWeatherClient::with_base_url(api_key.to_owned(), base)?,
        None => OpenWeatherClient::new(api_key.to_owned())?,
    };

    Ok(client)
}
