//! Interactive `kiwi configure`.

use std::sync::Arc;

use anyhow::bail;
use inquire::{Confirm, Password, PasswordDisplayMode, Select, Text, validator::Validation};
use kiwi_weather_core::{
    Config, NotificationScheduler, TemperatureUnit,
    notify::{LogNotifier, parse_time},
};

pub fn run() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message(key_help(&config))
        .prompt()?;

    let key = key.trim();
    if !key.is_empty() {
        config.set_api_key(key.to_string());
    } else if !config.is_configured() {
        bail!("An API key is required");
    }

    let options = vec![TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit];
    let cursor = options.iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Temperature unit:", options)
        .with_starting_cursor(cursor)
        .prompt()?;

    let notifications = &mut config.notifications;
    notifications.enabled = Confirm::new("Enable notifications?")
        .with_default(notifications.enabled)
        .prompt()?;

    if notifications.enabled {
        let scheduler = NotificationScheduler::new(Arc::new(LogNotifier));
        if !scheduler.request_permission() {
            tracing::warn!("notification permission denied, reminders will not fire");
        }

        notifications.daily_forecast = Confirm::new("Daily forecast reminder?")
            .with_default(notifications.daily_forecast)
            .prompt()?;

        if notifications.daily_forecast {
            let current = format!(
                "{:02}:{:02}",
                notifications.reminder_hour, notifications.reminder_minute
            );
            let answer = Text::new("Reminder time (HH:MM):")
                .with_default(&current)
                .with_validator(|input: &str| {
                    Ok(match parse_time(input) {
                        Ok(_) => Validation::Valid,
                        Err(err) => Validation::Invalid(err.to_string().into()),
                    })
                })
                .prompt()?;

            let (hour, minute) = parse_time(&answer)?;
            notifications.reminder_hour = hour;
            notifications.reminder_minute = minute;
        }

        notifications.weather_alerts = Confirm::new("Weather alerts (rain, snow, heat, frost)?")
            .with_default(notifications.weather_alerts)
            .prompt()?;

        if let Some(reminder) = scheduler.schedule_from_settings(notifications)? {
            println!("Scheduled \"{}\" {}.", reminder.title, reminder.trigger);
        }
    }

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

/// An environment key counts as configured, so an empty answer keeps it.
fn key_help(config: &Config) -> &'static str {
    if config.is_configured() {
        "Leave empty to keep the current key"
    } else {
        "Get a free key at https://openweathermap.org/api"
    }
}
