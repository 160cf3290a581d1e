use kiwi_weather_core::{ConditionKind, CurrentConditions, ForecastEntry, TemperatureUnit, WeatherState};

pub fn render_state(state: &WeatherState, units: TemperatureUnit) -> String {
    let mut out = String::new();

    if let Some(current) = &state.current {
        out.push_str(&render_current(current, units));
    }

    if !state.forecast.is_empty() {
        out.push('\n');
        out.push_str(&render_forecast(&state.forecast, units));
    }

    out
}

pub fn render_current(current: &CurrentConditions, units: TemperatureUnit) -> String {
    let glyph = ConditionKind::from_label(&current.condition).glyph();

    let mut out = format!("{}  {} {}\n", current.location, glyph, current.condition);
    out.push_str(&format!(
        "  Temperature  {} (feels like {})\n",
        units.format(current.temperature),
        units.format(current.feels_like)
    ));
    out.push_str(&format!("  Humidity     {}%\n", current.humidity));
    out.push_str(&format!("  Wind         {:.1} m/s\n", current.wind_speed));
    out.push_str(&format!("  Pressure     {} hPa\n", current.pressure));

    out
}

/// One row per day. The weekday comes from the entry's calendar date, the
/// same day the normalizer grouped the samples by.
pub fn render_forecast(days: &[ForecastEntry], units: TemperatureUnit) -> String {
    let mut out = format!("{}-day forecast\n", days.len());

    for day in days {
        let weekday = day.date.format("%a");
        let glyph = ConditionKind::from_label(&day.condition).glyph();
        out.push_str(&format!(
            "  {weekday}  {glyph} {:<12} {:>6}  ({} / {})\n",
            day.condition,
            units.format(day.temperature),
            units.format(day.min_temperature),
            units.format(day.max_temperature),
        ));
    }

    out
}
