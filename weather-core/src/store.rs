//! Weather state container.
//!
//! A single [`watch`] channel holds the latest [`WeatherState`]; the store is
//! its only writer and observers call [`WeatherStore::subscribe`]. A search
//! fetches current conditions, then the forecast for the same query.
//!
//! Known race: a new search does not cancel an earlier one still in flight,
//! so a slow earlier forecast can land after a newer one. Callers that care
//! can cancel explicitly with [`WeatherStore::cancel_all`] or a token passed
//! to [`WeatherStore::search_with`].

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{
    CurrentConditions, ForecastEntry, Query,
    notify::{ALERT_DELAY_HOURS, NotificationScheduler, needs_alert},
    provider::WeatherSource,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherState {
    pub current: Option<CurrentConditions>,
    pub forecast: Vec<ForecastEntry>,
    pub is_loading: bool,
    pub error_message: Option<String>,
}

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Blank city; nothing was requested.
    Ignored,
    /// Current conditions failed; the message is in `error_message`.
    Failed,
    /// Current conditions loaded. `forecast_updated` is false when the
    /// forecast fetch failed and the previous forecast was kept.
    Completed { forecast_updated: bool },
    /// The token was cancelled before the search finished.
    Cancelled,
}

#[derive(Debug)]
pub struct WeatherStore {
    source: Arc<dyn WeatherSource>,
    alerts: Option<NotificationScheduler>,
    state: watch::Sender<WeatherState>,
    root: Mutex<CancellationToken>,
}

impl WeatherStore {
    /// `alerts` is `None` when weather alerts are switched off.
    pub fn new(source: Arc<dyn WeatherSource>, alerts: Option<NotificationScheduler>) -> Self {
        let (state, _) = watch::channel(WeatherState::default());
        Self {
            source,
            alerts,
            state,
            root: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<WeatherState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> WeatherState {
        self.state.borrow().clone()
    }

    /// A token cancelled by the next [`cancel_all`](Self::cancel_all).
    pub fn request_token(&self) -> CancellationToken {
        match self.root.lock() {
            Ok(root) => root.child_token(),
            Err(poisoned) => poisoned.into_inner().child_token(),
        }
    }

    /// Cancel every search started so far. Later searches are unaffected.
    pub fn cancel_all(&self) {
        let fresh = CancellationToken::new();
        let old = match self.root.lock() {
            Ok(mut root) => std::mem::replace(&mut *root, fresh),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), fresh),
        };
        old.cancel();
    }

    pub async fn search(&self, query: &Query) -> SearchOutcome {
        let token = self.request_token();
        self.search_with(query, token).await
    }

    pub async fn search_with(&self, query: &Query, token: CancellationToken) -> SearchOutcome {
        if query.is_blank() {
            return SearchOutcome::Ignored;
        }

        if token.is_cancelled() {
            return SearchOutcome::Cancelled;
        }

        tracing::info!(%query, "fetching weather");
        let mut prior = (None, None);
        self.state.send_modify(|s| {
            prior = (s.current.take(), s.error_message.take());
            s.is_loading = true;
        });

        let current = tokio::select! {
            biased;
            _ = token.cancelled() => return self.abandon(prior),
            res = self.source.current(query) => res,
        };

        let current = match current {
            Ok(current) => current,
            Err(err) => {
                let message = err.user_message();
                tracing::warn!(%query, error = %err, "current conditions failed");
                self.state.send_modify(|s| {
                    s.is_loading = false;
                    s.error_message = Some(message);
                });
                return SearchOutcome::Failed;
            }
        };

        if token.is_cancelled() {
            return self.abandon(prior);
        }

        self.maybe_alert(&current);
        self.state.send_modify(|s| {
            s.is_loading = false;
            s.current = Some(current);
        });

        let forecast = tokio::select! {
            biased;
            _ = token.cancelled() => return SearchOutcome::Cancelled,
            res = self.source.forecast(query) => res,
        };

        match forecast {
            Ok(days) if !token.is_cancelled() => {
                tracing::debug!(days = days.len(), "forecast updated");
                self.state.send_modify(|s| s.forecast = days);
                SearchOutcome::Completed { forecast_updated: true }
            }
            Ok(_) => SearchOutcome::Cancelled,
            Err(err) => {
                tracing::warn!(%query, error = %err, "forecast failed, keeping previous forecast");
                SearchOutcome::Completed { forecast_updated: false }
            }
        }
    }

    /// Put back what the loading write cleared. Only used before the new
    /// conditions are published; after that a cancelled search leaves the
    /// state as it is.
    fn abandon(&self, prior: (Option<CurrentConditions>, Option<String>)) -> SearchOutcome {
        tracing::debug!("search cancelled");
        let (current, error_message) = prior;
        self.state.send_modify(|s| {
            s.is_loading = false;
            s.current = current;
            s.error_message = error_message;
        });
        SearchOutcome::Cancelled
    }

    fn maybe_alert(&self, current: &CurrentConditions) {
        let Some(alerts) = &self.alerts else {
            return;
        };
        if !needs_alert(&current.condition, current.temperature) {
            return;
        }

        if let Err(err) =
            alerts.schedule_weather_alert(&current.condition, current.temperature, ALERT_DELAY_HOURS)
        {
            tracing::warn!(error = %err, "could not schedule weather alert");
        }
    }
}
