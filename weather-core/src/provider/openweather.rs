use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::instrument;

use crate::{
    error::WeatherError,
    forecast::{normalize, parse_forecast_samples},
    model::{CurrentConditions, ForecastEntry, ForecastSample, Query},
    parse::{parse_current_for, parse_json},
};

use super::WeatherSource;

pub const OPENWEATHER_API_BASE: &str = "https://api.openweathermap.org/data/2.5";

const USER_AGENT: &str = concat!("kiwi-weather/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Result<Self, WeatherError> {
        Self::with_base_url(api_key, OPENWEATHER_API_BASE)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    #[instrument(skip(self, query), fields(query = %query), level = "debug")]
    pub async fn fetch_current(&self, query: &Query) -> Result<CurrentConditions, WeatherError> {
        let json = self.get_json("weather", query).await?;
        parse_current_for(&json, query)
    }

    /// Raw 3-hourly samples, before per-day normalization.
    #[instrument(skip(self, query), fields(query = %query), level = "debug")]
    pub async fn fetch_forecast_samples(
        &self,
        query: &Query,
    ) -> Result<Vec<ForecastSample>, WeatherError> {
        let json = self.get_json("forecast", query).await?;
        parse_forecast_samples(&json, query)
    }

    pub async fn fetch_forecast(&self, query: &Query) -> Result<Vec<ForecastEntry>, WeatherError> {
        let samples = self.fetch_forecast_samples(query).await?;
        let days = normalize(samples);
        tracing::debug!(days = days.len(), "forecast normalized");
        Ok(days)
    }

    /// GET `{base}/{endpoint}` and decode the body as JSON.
    ///
    /// The body is decoded whatever the HTTP status: OpenWeather reports
    /// failures as JSON carrying a `cod` field.
    async fn get_json(
        &self,
        endpoint: &str,
        query: &Query,
    ) -> Result<serde_json::Value, WeatherError> {
        query.validate()?;

        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(%url, "requesting");

        let mut params = query.params();
        params.push(("appid", self.api_key.clone()));
        params.push(("units", "metric".to_string()));

        let res = self.http.get(&url).query(&params).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::debug!(%status, body = %truncate_body(&body), "non-success status");
        }

        parse_json(&body)
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current(&self, query: &Query) -> Result<CurrentConditions, WeatherError> {
        self.fetch_current(query).await
    }

    async fn forecast(&self, query: &Query) -> Result<Vec<ForecastEntry>, WeatherError> {
        self.fetch_forecast(query).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
