//! Free-text condition normalization.
//!
//! The table is scanned top to bottom and the first group with any keyword
//! contained in the text wins, so declaration order decides ties.

use crate::types::{Condition, WeatherCategory};

/// Keyword groups in evaluation order. Matching is case-sensitive substring search.
pub const CONDITION_KEYWORDS: &[(&[&str], WeatherCategory)] = &[
    (
        &["Cloud", "cloud", "overcast", "Overcast", "foggy", "Foggy"],
        WeatherCategory::Cloudy,
    ),
    (&["Rain", "rain", "Drizzle", "drizzle"], WeatherCategory::Rainy),
    (&["Snow", "snow"], WeatherCategory::Snowy),
    (&["Sun", "sun", "Clear", "clear"], WeatherCategory::Sunny),
];

/// Map raw summary text to a category, or keep the text verbatim when nothing matches
pub fn normalize_condition(raw: &str) -> Condition {
    match categorize(raw) {
        Some(category) => Condition::Category(category),
        None => {
            tracing::debug!("No condition keyword in {:?}, keeping raw text", raw);
            Condition::Raw(raw.to_string())
        }
    }
}

/// First category whose keyword group matches `raw`
pub fn categorize(raw: &str) -> Option<WeatherCategory> {
    CONDITION_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| raw.contains(k)))
        .map(|(_, category)| *category)
}
