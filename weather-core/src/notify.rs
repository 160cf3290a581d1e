//! Local reminders: a recurring daily forecast nudge and one-shot weather
//! alerts chosen by simple threshold rules.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use serde::Serialize;
use uuid::Uuid;

use crate::{
    config::NotificationSettings,
    error::ScheduleError,
};

pub const ALERT_TITLE: &str = "Weather Alert";
pub const DAILY_TITLE: &str = "Kiwi Weather Daily Forecast";
pub const DAILY_BODY: &str = "Here's your weather forecast for today!";

/// Delay before an alert fires after a lookup.
pub const ALERT_DELAY_HOURS: u64 = 1;

const HOT_ABOVE: f64 = 30.0;
const FREEZING_BELOW: f64 = 0.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    /// Fires every day at the given local time.
    Daily { hour: u32, minute: u32 },
    /// Fires once after the delay.
    After(Duration),
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trigger::Daily { hour, minute } => write!(f, "daily at {hour:02}:{minute:02}"),
            Trigger::After(delay) => write!(f, "in {}s", delay.as_secs()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reminder {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub trigger: Trigger,
}

/// Whether current conditions warrant an alert.
pub fn needs_alert(condition: &str, temperature: f64) -> bool {
    let c = condition.to_lowercase();
    c.contains("rain") || c.contains("snow") || temperature > HOT_ABOVE || temperature < FREEZING_BELOW
}

/// Alert text; the first matching rule wins.
pub fn alert_body(condition: &str, temperature: f64) -> String {
    let c = condition.to_lowercase();
    let t = temperature.trunc() as i64;

    if c.contains("rain") {
        "Rain expected in your area. Don't forget your umbrella!".to_string()
    } else if c.contains("snow") {
        "Snow expected in your area. Bundle up!".to_string()
    } else if temperature > HOT_ABOVE {
        format!("High temperature alert: {t}°C expected. Stay hydrated!")
    } else if temperature < FREEZING_BELOW {
        format!("Freezing temperature alert: {t}°C expected. Stay warm!")
    } else {
        format!("Current weather: {condition}, {t}°C")
    }
}

/// Parse `HH:MM` into a validated hour and minute.
pub fn parse_time(s: &str) -> Result<(u32, u32), ScheduleError> {
    let unparseable = || ScheduleError::Unparseable(s.to_string());

    let (h, m) = s.trim().split_once(':').ok_or_else(unparseable)?;
    let hour: u32 = h.parse().map_err(|_| unparseable())?;
    let minute: u32 = m.parse().map_err(|_| unparseable())?;

    validate_time(hour, minute)?;
    Ok((hour, minute))
}

fn validate_time(hour: u32, minute: u32) -> Result<(), ScheduleError> {
    if hour < 24 && minute < 60 {
        Ok(())
    } else {
        Err(ScheduleError::InvalidTime { hour, minute })
    }
}

/// Delivery channel for reminders.
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Ask the platform for permission to post notifications.
    fn request_permission(&self) -> bool;

    fn schedule(&self, reminder: &Reminder) -> Result<(), ScheduleError>;
}

/// Emits reminders as log events. The CLI has no notification center of its
/// own, so this is how scheduled reminders surface there.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn request_permission(&self) -> bool {
        true
    }

    fn schedule(&self, reminder: &Reminder) -> Result<(), ScheduleError> {
        tracing::info!(
            id = %reminder.id,
            trigger = %reminder.trigger,
            title = %reminder.title,
            body = %reminder.body,
            "reminder scheduled"
        );
        Ok(())
    }
}

/// Keeps scheduled reminders in memory.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    scheduled: Mutex<Vec<Reminder>>,
    denied: bool,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose permission request is refused.
    pub fn denied() -> Self {
        Self {
            denied: true,
            ..Self::default()
        }
    }

    pub fn scheduled(&self) -> Vec<Reminder> {
        self.scheduled
            .lock()
            .map(|list| list.clone())
            .unwrap_or_default()
    }
}

impl Notifier for MemoryNotifier {
    fn request_permission(&self) -> bool {
        !self.denied
    }

    fn schedule(&self, reminder: &Reminder) -> Result<(), ScheduleError> {
        if self.denied {
            return Err(ScheduleError::Delivery("permission denied".to_string()));
        }
        self.scheduled
            .lock()
            .map_err(|_| ScheduleError::Delivery("reminder list poisoned".to_string()))?
            .push(reminder.clone());
        Ok(())
    }
}

/// Builds reminders and hands them to a [`Notifier`].
#[derive(Debug, Clone)]
pub struct NotificationScheduler {
    notifier: Arc<dyn Notifier>,
}

impl NotificationScheduler {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    pub fn request_permission(&self) -> bool {
        let granted = self.notifier.request_permission();
        if granted {
            tracing::debug!("notification permission granted");
        } else {
            tracing::warn!("notification permission denied");
        }
        granted
    }

    /// Recurring reminder at `hour:minute` every day.
    pub fn schedule_daily(
        &self,
        title: &str,
        body: &str,
        hour: u32,
        minute: u32,
    ) -> Result<Reminder, ScheduleError> {
        validate_time(hour, minute)?;
        self.submit(title, body.to_string(), Trigger::Daily { hour, minute })
    }

    pub fn schedule_daily_forecast(&self, hour: u32, minute: u32) -> Result<Reminder, ScheduleError> {
        self.schedule_daily(DAILY_TITLE, DAILY_BODY, hour, minute)
    }

    /// Daily forecast reminder as configured, or `None` when switched off.
    pub fn schedule_from_settings(
        &self,
        settings: &NotificationSettings,
    ) -> Result<Option<Reminder>, ScheduleError> {
        if !settings.daily_forecast_active() {
            return Ok(None);
        }
        self.schedule_daily_forecast(settings.reminder_hour, settings.reminder_minute)
            .map(Some)
    }

    /// One-shot alert firing `hours` from now.
    pub fn schedule_weather_alert(
        &self,
        condition: &str,
        temperature: f64,
        hours: u64,
    ) -> Result<Reminder, ScheduleError> {
        let body = alert_body(condition, temperature);
        let delay = Duration::from_secs(hours.saturating_mul(3600));
        self.submit(ALERT_TITLE, body, Trigger::After(delay))
    }

    fn submit(&self, title: &str, body: String, trigger: Trigger) -> Result<Reminder, ScheduleError> {
        let reminder = Reminder {
            id: Uuid::new_v4(),
            title: title.to_string(),
            body,
            trigger,
        };
        self.notifier.schedule(&reminder)?;
        Ok(reminder)
    }
}
