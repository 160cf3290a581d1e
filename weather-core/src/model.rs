use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// What to look weather up for.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    City(String),
    Coordinates { lat: f64, lon: f64 },
}

impl Query {
    pub fn city(name: impl Into<String>) -> Self {
        Query::City(name.into())
    }

    pub fn coordinates(lat: f64, lon: f64) -> Self {
        Query::Coordinates { lat, lon }
    }

    /// True for a city query with nothing but whitespace in it.
    pub fn is_blank(&self) -> bool {
        matches!(self, Query::City(name) if name.trim().is_empty())
    }

    pub fn validate(&self) -> Result<(), WeatherError> {
        match self {
            Query::City(name) if name.trim().is_empty() => {
                Err(WeatherError::InvalidQuery("Invalid city name".to_string()))
            }
            Query::City(_) => Ok(()),
            Query::Coordinates { lat, lon } => {
                if (-90.0..=90.0).contains(lat) && (-180.0..=180.0).contains(lon) {
                    Ok(())
                } else {
                    Err(WeatherError::InvalidQuery("Invalid location".to_string()))
                }
            }
        }
    }

    /// Query-string pairs identifying the location.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            Query::City(name) => vec![("q", name.trim().to_string())],
            Query::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        }
    }

    /// Location name used when the response carries none.
    pub fn fallback_name(&self) -> &'static str {
        match self {
            Query::City(_) => "Unknown",
            Query::Coordinates { .. } => "Current Location",
        }
    }

    /// Message used when the API rejects the query without one.
    pub fn not_found_message(&self) -> &'static str {
        match self {
            Query::City(_) => "City not found",
            Query::Coordinates { .. } => "Location not found",
        }
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Query::City(name) => f.write_str(name.trim()),
            Query::Coordinates { lat, lon } => write!(f, "{lat:.4},{lon:.4}"),
        }
    }
}

/// Latest weather snapshot for a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location: String,
    pub temperature: f64,
    pub feels_like: f64,
    /// Relative humidity in percent.
    pub humidity: i64,
    /// Sea-level pressure in hPa.
    pub pressure: i64,
    pub wind_speed: f64,
    pub condition: String,
}

/// One raw entry of the 3-hourly forecast feed.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    /// Unix seconds.
    pub timestamp: i64,
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub condition: String,
    pub icon: String,
}

/// One day's summary, taken from the first sample seen for that day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub date: NaiveDate,
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub condition: String,
    pub icon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }

    /// Convert a Celsius reading to this unit.
    pub fn convert(&self, celsius: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    /// Whole degrees, truncated toward zero, with the unit symbol.
    pub fn format(&self, celsius: f64) -> String {
        format!("{}{}", self.convert(celsius).trunc() as i64, self.symbol())
    }
}

impl std::str::FromStr for TemperatureUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "c" | "celsius" | "metric" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" | "imperial" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(anyhow::anyhow!(
                "Unknown unit '{s}'. Supported units: celsius, fahrenheit."
            )),
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemperatureUnit::Celsius => f.write_str("Celsius (°C)"),
            TemperatureUnit::Fahrenheit => f.write_str("Fahrenheit (°F)"),
        }
    }
}

/// Coarse category of a condition label, used to pick a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    Clear,
    Clouds,
    Rain,
    Snow,
    Thunderstorm,
    Fog,
}

impl ConditionKind {
    pub fn from_label(label: &str) -> Self {
        let s = label.to_lowercase();
        if s.contains("clear") {
            ConditionKind::Clear
        } else if s.contains("cloud") {
            ConditionKind::Clouds
        } else if s.contains("rain") {
            ConditionKind::Rain
        } else if s.contains("snow") {
            ConditionKind::Snow
        } else if s.contains("thunder") {
            ConditionKind::Thunderstorm
        } else if s.contains("mist") || s.contains("fog") {
            ConditionKind::Fog
        } else {
            ConditionKind::Clouds
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            ConditionKind::Clear => "☀",
            ConditionKind::Clouds => "☁",
            ConditionKind::Rain => "☂",
            ConditionKind::Snow => "❄",
            ConditionKind::Thunderstorm => "⚡",
            ConditionKind::Fog => "≋",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(21.7, TemperatureUnit::Celsius, "21°C")]
    #[case(-0.5, TemperatureUnit::Celsius, "0°C")]
    #[case(-3.9, TemperatureUnit::Celsius, "-3°C")]
    #[case(21.0, TemperatureUnit::Fahrenheit, "69°F")]
    #[case(100.0, TemperatureUnit::Fahrenheit, "212°F")]
    fn formats_truncated_degrees(
        #[case] celsius: f64,
        #[case] unit: TemperatureUnit,
        #[case] expected: &str,
    ) {
        assert_eq!(unit.format(celsius), expected);
    }

    #[rstest]
    #[case("Clear", ConditionKind::Clear)]
    #[case("Clouds", ConditionKind::Clouds)]
    #[case("Rain", ConditionKind::Rain)]
    #[case("Snow", ConditionKind::Snow)]
    #[case("Thunderstorm", ConditionKind::Thunderstorm)]
    #[case("Mist", ConditionKind::Fog)]
    #[case("Fog", ConditionKind::Fog)]
    #[case("Drizzle", ConditionKind::Clouds)]
    fn classifies_condition_labels(#[case] label: &str, #[case] kind: ConditionKind) {
        assert_eq!(ConditionKind::from_label(label), kind);
    }

    #[test]
    fn blank_city_is_invalid() {
        let q = Query::city("   ");
        assert!(q.is_blank());
        assert!(matches!(q.validate(), Err(WeatherError::InvalidQuery(_))));
    }

    #[test]
    fn out_of_range_coordinates_are_invalid() {
        assert!(Query::coordinates(91.0, 0.0).validate().is_err());
        assert!(Query::coordinates(0.0, -181.0).validate().is_err());
        assert!(Query::coordinates(-41.29, 174.78).validate().is_ok());
    }

    #[test]
    fn query_params_and_fallbacks() {
        let city = Query::city(" Wellington ");
        assert_eq!(city.params(), vec![("q", "Wellington".to_string())]);
        assert_eq!(city.fallback_name(), "Unknown");

        let coords = Query::coordinates(-41.5, 174.25);
        assert_eq!(
            coords.params(),
            vec![("lat", "-41.5".to_string()), ("lon", "174.25".to_string())]
        );
        assert_eq!(coords.fallback_name(), "Current Location");
        assert_eq!(coords.not_found_message(), "Location not found");
    }

    #[test]
    fn unit_from_str() {
        assert_eq!("F".parse::<TemperatureUnit>().unwrap(), TemperatureUnit::Fahrenheit);
        assert_eq!("celsius".parse::<TemperatureUnit>().unwrap(), TemperatureUnit::Celsius);
        assert!("kelvin".parse::<TemperatureUnit>().is_err());
    }
}
