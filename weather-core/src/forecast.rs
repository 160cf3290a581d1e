//! Forecast feed parsing and per-day normalization.
//!
//! The 5-day feed carries a sample every three hours. The UI wants one row per
//! calendar day, so [`normalize`] keeps the first sample seen for each day and
//! stops after [`MAX_FORECAST_DAYS`] days.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::{
    error::WeatherError,
    model::{ForecastEntry, ForecastSample, Query},
    parse::{UNKNOWN, as_response_object, check_cod, f64_or_zero, first_weather, str_or},
};

pub const MAX_FORECAST_DAYS: usize = 5;

const DEFAULT_ICON: &str = "01d";

/// Extract the samples from a `/forecast` payload.
///
/// Items without `dt`, `main` or a `weather` entry are skipped individually.
pub fn parse_forecast_samples(
    json: &Value,
    query: &Query,
) -> Result<Vec<ForecastSample>, WeatherError> {
    let obj = as_response_object(json)?;
    check_cod(obj, query)?;

    let list = obj.get("list").and_then(Value::as_array).ok_or_else(|| {
        WeatherError::MalformedResponse("Could not parse forecast data".to_string())
    })?;

    let samples: Vec<ForecastSample> = list
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            let sample = parse_sample(item);
            if sample.is_none() {
                tracing::debug!(index = idx, "skipping incomplete forecast item");
            }
            sample
        })
        .collect();

    Ok(samples)
}

fn parse_sample(item: &Value) -> Option<ForecastSample> {
    let obj = item.as_object()?;
    let timestamp = obj.get("dt").and_then(unix_seconds)?;
    let main = obj.get("main").and_then(Value::as_object)?;
    let weather = first_weather(obj)?;

    Some(ForecastSample {
        timestamp,
        temperature: f64_or_zero(main, "temp"),
        temp_min: f64_or_zero(main, "temp_min"),
        temp_max: f64_or_zero(main, "temp_max"),
        condition: str_or(weather, "main", UNKNOWN),
        icon: str_or(weather, "icon", DEFAULT_ICON),
    })
}

fn unix_seconds(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
}

/// Collapse samples to one entry per calendar day in the local timezone.
pub fn normalize<I>(samples: I) -> Vec<ForecastEntry>
where
    I: IntoIterator<Item = ForecastSample>,
{
    normalize_in(samples, &Local)
}

/// Collapse samples to one entry per calendar day in `tz`.
///
/// Input order is preserved and the first sample of a day wins. A sample whose
/// day is not after the last accepted day is dropped, so the output dates are
/// strictly increasing even for unordered input. Scanning stops once
/// [`MAX_FORECAST_DAYS`] entries are collected.
pub fn normalize_in<I, Tz>(samples: I, tz: &Tz) -> Vec<ForecastEntry>
where
    I: IntoIterator<Item = ForecastSample>,
    Tz: TimeZone,
{
    let mut days: Vec<ForecastEntry> = Vec::with_capacity(MAX_FORECAST_DAYS);
    let mut last_day: Option<NaiveDate> = None;

    for sample in samples {
        let Some(time) = DateTime::<Utc>::from_timestamp(sample.timestamp, 0) else {
            tracing::debug!(timestamp = sample.timestamp, "timestamp out of range");
            continue;
        };
        let date = time.with_timezone(tz).date_naive();

        if last_day.is_some_and(|seen| date <= seen) {
            continue;
        }
        last_day = Some(date);

        days.push(ForecastEntry {
            date,
            time,
            temperature: sample.temperature,
            min_temperature: sample.temp_min,
            max_temperature: sample.temp_max,
            condition: sample.condition,
            icon: sample.icon,
        });

        if days.len() >= MAX_FORECAST_DAYS {
            break;
        }
    }

    days
}
