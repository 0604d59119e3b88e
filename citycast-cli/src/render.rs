//! Human-friendly output.

use chrono::NaiveDate;
use citycast_core::{Condition, ForecastDay, Location, Weather};

pub fn print_locations(locations: &[Location]) {
    if locations.is_empty() {
        println!("No locations found.");
        return;
    }
    for location in locations {
        println!("{:>8}  {location}", location.id);
    }
}

/// `show_icons` adds the condition icon URLs (set by `--verbose`).
pub fn print_weather(weather: &Weather, show_icons: bool) {
    let current = &weather.current;

    println!("{}", weather.location_label);
    println!(
        "  {:.1}°C (feels like {:.1}°C), {}",
        current.temperature_c, current.feels_like_c, current.condition.text
    );
    println!(
        "  humidity {}%  wind {:.1} km/h  pressure {:.0} mb",
        current.humidity_pct, current.wind_kph, current.pressure_mb
    );
    if show_icons {
        println!("{}", icon_line(&current.condition));
    }

    if weather.forecast_days.is_empty() {
        return;
    }
    println!();
    for day in &weather.forecast_days {
        println!("  {}", day_line(day));
        if show_icons {
            println!("  {}", icon_line(&day.condition));
        }
    }
}

fn icon_line(condition: &Condition) -> String {
    format!("  icon {}", condition.icon_url())
}

fn day_line(day: &ForecastDay) -> String {
    format!(
        "{:<10}  {:>5.1}° / {:>5.1}°  avg {:>5.1}°  {:>3}%  {}",
        day_label(&day.date),
        day.max_temp_c,
        day.min_temp_c,
        day.avg_temp_c,
        day.avg_humidity_pct,
        day.condition.text
    )
}

/// `2024-01-15` -> `Mon 15 Jan`; unparseable dates are shown as-is.
fn day_label(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%a %d %b").to_string())
        .unwrap_or_else(|_| date.to_string())
}
