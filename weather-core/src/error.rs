//! Error types surfaced by the weather core.

use thiserror::Error;

/// Failure of a weather lookup.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Transport-level failure: connect, timeout, or reading the body.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The API answered with a `cod` other than "200".
    #[error("{0}")]
    NotFound(String),

    /// Required JSON shape was missing.
    #[error("{0}")]
    MalformedResponse(String),

    /// The query was rejected before any request was made.
    #[error("{0}")]
    InvalidQuery(String),
}

impl WeatherError {
    /// The single human-readable message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(err) => format!("Error: {}", network_reason(err)),
            Self::NotFound(msg) | Self::MalformedResponse(msg) | Self::InvalidQuery(msg) => {
                format!("Error: {msg}")
            }
        }
    }
}

// The request URL carries the API key in its query string.
impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.without_url())
    }
}

fn network_reason(err: &reqwest::Error) -> &'static str {
    if err.is_timeout() {
        "The request timed out"
    } else if err.is_connect() {
        "Could not connect to the weather service"
    } else if err.is_body() || err.is_decode() {
        "No data received"
    } else {
        "Network request failed"
    }
}

/// Failure to schedule a reminder.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid reminder time {hour:02}:{minute:02}")]
    InvalidTime { hour: u32, minute: u32 },

    #[error("Invalid reminder time '{0}', expected HH:MM")]
    Unparseable(String),

    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}
