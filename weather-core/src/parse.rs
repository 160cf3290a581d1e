//! Lenient parsing of OpenWeather current-conditions payloads.
//!
//! Required structure (`main`, `wind`, one `weather` entry) must be present;
//! missing leaf scalars fall back to `0` / `"Unknown"` instead of failing.

use serde_json::{Map, Value};

use crate::{
    error::WeatherError,
    model::{CurrentConditions, Query},
};

pub(crate) const UNKNOWN: &str = "Unknown";

/// Parse a current-conditions payload, using "Unknown" for a missing name.
pub fn parse_current(json: &Value) -> Result<CurrentConditions, WeatherError> {
    parse_current_for(json, &Query::City(String::new()))
}

/// Parse a current-conditions payload with the fallbacks of `query`.
pub fn parse_current_for(json: &Value, query: &Query) -> Result<CurrentConditions, WeatherError> {
    let obj = as_response_object(json)?;
    check_cod(obj, query)?;

    let main = obj.get("main").and_then(Value::as_object);
    let wind = obj.get("wind").and_then(Value::as_object);
    let weather = first_weather(obj);

    let (Some(main), Some(wind), Some(weather)) = (main, wind, weather) else {
        return Err(WeatherError::MalformedResponse(
            "Could not parse weather data".to_string(),
        ));
    };

    Ok(CurrentConditions {
        location: str_or(obj, "name", query.fallback_name()),
        temperature: f64_or_zero(main, "temp"),
        feels_like: f64_or_zero(main, "feels_like"),
        humidity: int_or_zero(main, "humidity"),
        pressure: int_or_zero(main, "pressure"),
        wind_speed: f64_or_zero(wind, "speed"),
        condition: str_or(weather, "main", UNKNOWN),
    })
}

/// Parse raw response text.
pub fn parse_current_body(body: &str, query: &Query) -> Result<CurrentConditions, WeatherError> {
    let json = parse_json(body)?;
    parse_current_for(&json, query)
}

pub(crate) fn parse_json(body: &str) -> Result<Value, WeatherError> {
    serde_json::from_str(body).map_err(|err| {
        tracing::debug!(error = %err, "response body is not JSON");
        WeatherError::MalformedResponse("Invalid response format".to_string())
    })
}

pub(crate) fn as_response_object(json: &Value) -> Result<&Map<String, Value>, WeatherError> {
    json.as_object()
        .ok_or_else(|| WeatherError::MalformedResponse("Invalid response format".to_string()))
}

/// Fail with `NotFound` when `cod` is present and not "200".
///
/// OpenWeather sends `cod` as a number on success and a string on failure.
pub(crate) fn check_cod(obj: &Map<String, Value>, query: &Query) -> Result<(), WeatherError> {
    let cod = match obj.get("cod") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Ok(()),
    };

    if cod == "200" {
        return Ok(());
    }

    let message = obj
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_else(|| query.not_found_message())
        .to_string();

    tracing::debug!(%cod, %message, "API reported failure");
    Err(WeatherError::NotFound(message))
}

pub(crate) fn first_weather(obj: &Map<String, Value>) -> Option<&Map<String, Value>> {
    obj.get("weather")
        .and_then(Value::as_array)
        .and_then(|list| list.first())
        .and_then(Value::as_object)
}

pub(crate) fn f64_or_zero(obj: &Map<String, Value>, key: &str) -> f64 {
    obj.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

pub(crate) fn int_or_zero(obj: &Map<String, Value>, key: &str) -> i64 {
    obj.get(key).and_then(Value::as_i64).unwrap_or(0)
}

pub(crate) fn str_or(obj: &Map<String, Value>, key: &str, fallback: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "cod": 200,
            "name": "Wellington",
            "main": { "temp": 14.25, "feels_like": 12.5, "humidity": 82, "pressure": 1009 },
            "wind": { "speed": 7.2 },
            "weather": [{ "main": "Rain", "description": "light rain", "icon": "10d" }]
        })
    }

    #[test]
    fn well_formed_payload_reproduces_fields() {
        let parsed = parse_current(&payload()).unwrap();
        assert_eq!(
            parsed,
            CurrentConditions {
                location: "Wellington".into(),
                temperature: 14.25,
                feels_like: 12.5,
                humidity: 82,
                pressure: 1009,
                wind_speed: 7.2,
                condition: "Rain".into(),
            }
        );
    }

    #[test]
    fn string_cod_404_is_not_found_with_server_message() {
        let body = json!({ "cod": "404", "message": "city not found" });
        let err = parse_current(&body).unwrap_err();
        match err {
            WeatherError::NotFound(msg) => assert_eq!(msg, "city not found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn numeric_cod_401_is_not_found() {
        let body = json!({ "cod": 401, "message": "Invalid API key." });
        let err = parse_current(&body).unwrap_err();
        assert!(matches!(err, WeatherError::NotFound(ref m) if m == "Invalid API key."));
    }

    #[test]
    fn not_found_without_message_uses_query_default() {
        let body = json!({ "cod": "404" });
        let err = parse_current_for(&body, &Query::coordinates(1.0, 2.0)).unwrap_err();
        assert!(matches!(err, WeatherError::NotFound(ref m) if m == "Location not found"));
    }

    #[test]
    fn missing_wind_is_malformed() {
        let mut body = payload();
        body.as_object_mut().unwrap().remove("wind");
        let err = parse_current(&body).unwrap_err();
        assert!(matches!(err, WeatherError::MalformedResponse(_)));
    }

    #[test]
    fn empty_weather_array_is_malformed() {
        let mut body = payload();
        body["weather"] = json!([]);
        assert!(matches!(
            parse_current(&body),
            Err(WeatherError::MalformedResponse(_))
        ));
    }

    #[test]
    fn missing_humidity_defaults_to_zero() {
        let mut body = payload();
        body["main"].as_object_mut().unwrap().remove("humidity");
        let parsed = parse_current(&body).unwrap();
        assert_eq!(parsed.humidity, 0);
        assert_eq!(parsed.pressure, 1009);
    }

    #[test]
    fn missing_leaves_use_fallbacks() {
        let body = json!({ "main": {}, "wind": {}, "weather": [{}] });
        let parsed = parse_current(&body).unwrap();
        assert_eq!(parsed.location, "Unknown");
        assert_eq!(parsed.temperature, 0.0);
        assert_eq!(parsed.feels_like, 0.0);
        assert_eq!(parsed.wind_speed, 0.0);
        assert_eq!(parsed.condition, "Unknown");
    }

    #[test]
    fn coordinate_query_falls_back_to_current_location() {
        let mut body = payload();
        body.as_object_mut().unwrap().remove("name");
        let parsed = parse_current_for(&body, &Query::coordinates(-41.3, 174.8)).unwrap();
        assert_eq!(parsed.location, "Current Location");
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = parse_current_body("<html>bad gateway</html>", &Query::city("x")).unwrap_err();
        assert!(matches!(err, WeatherError::MalformedResponse(ref m) if m == "Invalid response format"));
    }

    #[test]
    fn non_object_json_is_malformed() {
        let err = parse_current(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, WeatherError::MalformedResponse(_)));
    }
}
