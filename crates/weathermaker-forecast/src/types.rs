use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Canonical weather categories a free-text condition is normalized into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherCategory {
    Cloudy,
    Rainy,
    Snowy,
    Sunny,
}

impl WeatherCategory {
    pub const ALL: [WeatherCategory; 4] = [Self::Cloudy, Self::Rainy, Self::Snowy, Self::Sunny];

    /// Get the canonical label, as stored and printed
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cloudy => "Cloudy",
            Self::Rainy => "Rainy",
            Self::Snowy => "Snowy",
            Self::Sunny => "Sunny",
        }
    }

    /// Parse a canonical label back into a category (exact match only)
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    /// RGB color the postcard gradient starts from
    pub fn gradient_color(&self) -> [u8; 3] {
        match self {
            Self::Cloudy => [128, 128, 128],
            Self::Rainy => [0, 0, 255],
            Self::Snowy => [0, 191, 255],
            Self::Sunny => [255, 255, 0],
        }
    }
}

impl fmt::Display for WeatherCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A day's condition: a recognized category, or the page text when nothing matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    Category(WeatherCategory),
    Raw(String),
}

impl Condition {
    /// Rebuild a condition from its stored text.
    pub fn from_stored(text: &str) -> Self {
        match WeatherCategory::from_label(text) {
            Some(category) => Self::Category(category),
            None => Self::Raw(text.to_string()),
        }
    }

    pub fn category(&self) -> Option<WeatherCategory> {
        match self {
            Self::Category(c) => Some(*c),
            Self::Raw(_) => None,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category(c) => f.write_str(c.label()),
            Self::Raw(text) => f.write_str(text),
        }
    }
}

/// One day of forecast data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub date: NaiveDate,
    pub temperature: String,
    pub condition: Condition,
    pub wind: String,
}

impl ForecastRecord {
    /// Single console line, fields in fixed order
    pub fn console_line(&self) -> String {
        format!(
            "Date: {}     Temperature: {}   Weather condition: {}   Wind: {}",
            self.date.format("%Y-%m-%d"),
            self.temperature,
            self.condition,
            self.wind
        )
    }

    /// `Key: value` lines drawn on a postcard, top to bottom
    pub fn postcard_lines(&self) -> [String; 4] {
        [
            format!("Date: {}", self.date.format("%Y-%m-%d")),
            format!("Temperature: {}", self.temperature),
            format!("Weather condition: {}", self.condition),
            format!("Wind: {}", self.wind),
        ]
    }
}

/// Forecast records keyed and ordered by date
pub type Forecast = BTreeMap<NaiveDate, ForecastRecord>;

/// The three page fields before the condition is normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    pub temperature: String,
    pub condition_text: String,
    pub wind: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn sample() -> ForecastRecord {
        ForecastRecord {
            date: NaiveDate::from_ymd_opt(2021, 6, 1).unwrap(),
            temperature: "15.0deg C".to_string(),
            condition: Condition::Category(WeatherCategory::Cloudy),
            wind: "10 km/h    NW".to_string(),
        }
    }

    #[test]
    fn test_label_round_trip() {
        for category in WeatherCategory::ALL {
            assert_eq!(WeatherCategory::from_label(category.label()), Some(category));
        }
        assert_eq!(WeatherCategory::from_label("cloudy"), None);
    }

    #[test]
    fn test_condition_from_stored() {
        assert_eq!(
            Condition::from_stored("Snowy"),
            Condition::Category(WeatherCategory::Snowy)
        );
        assert_eq!(
            Condition::from_stored("Humid and windy"),
            Condition::Raw("Humid and windy".to_string())
        );
    }

    #[test]
    fn test_console_line_field_order() {
        assert_eq!(
            sample().console_line(),
            "Date: 2021-06-01     Temperature: 15.0deg C   Weather condition: Cloudy   Wind: 10 km/h    NW"
        );
    }

    #[test]
    fn test_postcard_lines() {
        let lines = sample().postcard_lines();
        assert_eq!(lines[0], "Date: 2021-06-01");
        assert_eq!(lines[2], "Weather condition: Cloudy");
    }

    #[test]
    fn test_json_condition_is_plain_text() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"condition\":\"Cloudy\""));
        assert!(json.contains("\"date\":\"2021-06-01\""));

        let raw = ForecastRecord {
            condition: Condition::Raw("Humid".to_string()),
            ..sample()
        };
        let back: ForecastRecord =
            serde_json::from_str(&serde_json::to_string(&raw).unwrap()).unwrap();
        assert_eq!(back.condition, Condition::Raw("Humid".to_string()));
    }
}
