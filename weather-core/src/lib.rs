//! Core library for the `kiwi` weather CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client and lenient response parsing
//! - Forecast normalization (one entry per calendar day, at most five)
//! - Local reminder rules and scheduling
//! - A state container that runs searches and publishes the results
//!
//! It is used by `kiwi-weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod forecast;
pub mod model;
pub mod notify;
pub mod parse;
pub mod provider;
pub mod store;

pub use config::{Config, NotificationSettings};
pub use error::{ScheduleError, WeatherError};
pub use forecast::{MAX_FORECAST_DAYS, normalize, normalize_in};
pub use model::{
    ConditionKind, CurrentConditions, ForecastEntry, ForecastSample, Query, TemperatureUnit,
};
pub use notify::{NotificationScheduler, Notifier, Reminder, Trigger};
pub use parse::parse_current;
pub use provider::{WeatherSource, openweather::OpenWeatherClient};
pub use store::{SearchOutcome, WeatherState, WeatherStore};
