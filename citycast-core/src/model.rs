use serde::{Deserialize, Serialize};
use std::fmt;

/// A place returned by location search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub country: String,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.name, self.country)
    }
}

/// Textual condition plus the provider's icon reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    pub icon: String,
}

impl Condition {
    /// The provider hands out protocol-relative icon paths (`//cdn...`).
    pub fn icon_url(&self) -> String {
        if self.icon.starts_with("//") {
            format!("https:{}", self.icon)
        } else {
            self.icon.clone()
        }
    }
}

/// Current conditions, metric units as supplied by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub condition: Condition,
    pub humidity_pct: u8,
    pub wind_kph: f64,
    pub pressure_mb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// ISO `YYYY-MM-DD`.
    pub date: String,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub avg_temp_c: f64,
    pub condition: Condition,
    pub avg_humidity_pct: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    /// `"<name>, <country>"`.
    pub location_label: String,
    pub current: CurrentConditions,
    pub forecast_days: Vec<ForecastDay>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_url_adds_scheme_to_protocol_relative_paths() {
        let condition = Condition {
            text: "Sunny".into(),
            icon: "//cdn.weatherapi.com/weather/64x64/day/113.png".into(),
        };
        assert_eq!(condition.icon_url(), "https://cdn.weatherapi.com/weather/64x64/day/113.png");
    }

    #[test]
    fn location_displays_name_and_country() {
        let location = Location { id: 1, name: "Bogotá".into(), country: "Colombia".into() };
        assert_eq!(location.to_string(), "Bogotá, Colombia");
    }

    #[test]
    fn icon_url_keeps_absolute_urls() {
        let condition = Condition { text: "Sunny".into(), icon: "https://x/113.png".into() };
        assert_eq!(condition.icon_url(), "https://x/113.png");
    }
}
