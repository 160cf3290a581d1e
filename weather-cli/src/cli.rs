use std::sync::Arc;

use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use kiwi_weather_core::{
    Config, NotificationScheduler, Query, SearchOutcome, TemperatureUnit, WeatherStore,
    notify::{LogNotifier, alert_body, needs_alert, parse_time},
    provider::client_from_config,
};

use crate::{configure, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "kiwi", version, about = "Kiwi weather CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, units and notification preferences.
    Configure,

    /// Show current conditions and the 5-day forecast.
    Show {
        /// City name, e.g. "Wellington" or "Wellington,NZ".
        #[arg(conflicts_with = "lat")]
        city: Option<String>,

        /// Latitude in degrees; use with --lon instead of a city.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude in degrees.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Display unit: celsius or fahrenheit. Defaults to the configured unit.
        #[arg(long)]
        units: Option<TemperatureUnit>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Schedule the daily forecast reminder.
    Remind {
        /// Time of day as HH:MM; defaults to the configured time.
        #[arg(long)]
        at: Option<String>,

        /// Remember the time and enable the reminder in the config file.
        #[arg(long)]
        save: bool,
    },

    /// Preview the alert a given condition and temperature would raise.
    Alert {
        /// Condition label, e.g. "Rain".
        condition: String,

        /// Temperature in °C.
        #[arg(allow_hyphen_values = true)]
        temperature: f64,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure::run(),
            Command::Show {
                city,
                lat,
                lon,
                units,
                json,
            } => {
                let query = resolve_query(city, lat, lon)?;
                show(query, units, json).await
            }
            Command::Remind { at, save } => remind(at.as_deref(), save),
            Command::Alert {
                condition,
                temperature,
            } => {
                if needs_alert(&condition, temperature) {
                    println!("{}", alert_body(&condition, temperature));
                } else {
                    println!("No alert for {condition} at {temperature}°C.");
                }
                Ok(())
            }
        }
    }
}

fn resolve_query(city: Option<String>, lat: Option<f64>, lon: Option<f64>) -> anyhow::Result<Query> {
    match (city, lat, lon) {
        (_, Some(lat), Some(lon)) => Ok(Query::coordinates(lat, lon)),
        (Some(city), None, None) if !city.trim().is_empty() => Ok(Query::City(city)),
        _ => Err(anyhow!(
            "Provide a city name or both --lat and --lon.\n\
             Example: `kiwi show Wellington` or `kiwi show --lat -41.29 --lon 174.78`."
        )),
    }
}

async fn show(query: Query, units: Option<TemperatureUnit>, json: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = client_from_config(&config)?;
    let units = units.unwrap_or(config.units);

    let alerts = config
        .notifications
        .alerts_active()
        .then(|| NotificationScheduler::new(Arc::new(LogNotifier)));

    let store = WeatherStore::new(Arc::new(client), alerts);
    let outcome = store.search(&query).await;
    let state = store.snapshot();

    match outcome {
        SearchOutcome::Failed => {
            bail!(
                "{}",
                state
                    .error_message
                    .unwrap_or_else(|| "Error: weather lookup failed".to_string())
            )
        }
        SearchOutcome::Ignored | SearchOutcome::Cancelled => {
            bail!("Weather lookup for '{query}' did not run")
        }
        SearchOutcome::Completed { forecast_updated } => {
            if !forecast_updated {
                tracing::warn!("forecast unavailable, showing current conditions only");
            }
        }
    }

    if json {
        let out = serde_json::to_string_pretty(&state).context("Failed to serialize weather")?;
        println!("{out}");
    } else {
        print!("{}", render::render_state(&state, units));
    }

    Ok(())
}

fn remind(at: Option<&str>, save: bool) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let (hour, minute) = match at {
        Some(at) => parse_time(at)?,
        None => (
            config.notifications.reminder_hour,
            config.notifications.reminder_minute,
        ),
    };

    let scheduler = NotificationScheduler::new(Arc::new(LogNotifier));
    if !scheduler.request_permission() {
        bail!("Notification permission was not granted");
    }
    let reminder = scheduler.schedule_daily_forecast(hour, minute)?;
    println!("Scheduled \"{}\" {}.", reminder.title, reminder.trigger);

    if save {
        config.notifications.enabled = true;
        config.notifications.daily_forecast = true;
        config.notifications.reminder_hour = hour;
        config.notifications.reminder_minute = minute;
        let path = config.save()?;
        println!("Saved reminder time to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn resolves_city_query() {
        let q = resolve_query(Some("Hamilton".into()), None, None).unwrap();
        assert_eq!(q, Query::city("Hamilton"));
    }

    #[test]
    fn resolves_coordinate_query() {
        let q = resolve_query(None, Some(-37.78), Some(175.28)).unwrap();
        assert_eq!(q, Query::coordinates(-37.78, 175.28));
    }

    #[test]
    fn missing_location_is_an_error() {
        let err = resolve_query(None, None, None).unwrap_err();
        assert!(err.to_string().contains("Provide a city name"));

        assert!(resolve_query(Some("  ".into()), None, None).is_err());
    }

    #[test]
    fn parses_show_with_negative_latitude() {
        let cli = Cli::try_parse_from(["kiwi", "show", "--lat", "-41.29", "--lon", "174.78"]).unwrap();
        match cli.command {
            Command::Show { lat, lon, city, .. } => {
                assert_eq!(lat, Some(-41.29));
                assert_eq!(lon, Some(174.78));
                assert!(city.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn lat_without_lon_is_rejected() {
        assert!(Cli::try_parse_from(["kiwi", "show", "--lat", "10"]).is_err());
    }

    #[test]
    fn parses_units_flag() {
        let cli = Cli::try_parse_from(["kiwi", "show", "Auckland", "--units", "fahrenheit"]).unwrap();
        match cli.command {
            Command::Show { units, .. } => assert_eq!(units, Some(TemperatureUnit::Fahrenheit)),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
