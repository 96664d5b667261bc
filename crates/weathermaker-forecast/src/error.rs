//! Forecast retrieval error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Failure while retrieving a details page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Unreadable response body: {0}")]
    Body(String),

    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

/// The fetched page did not have the expected structure
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Expected region missing: {0}")]
    MissingRegion(&'static str),

    #[error("Region {region} has no {attribute} attribute")]
    MissingAttribute {
        region: &'static str,
        attribute: &'static str,
    },

    #[error("Invalid selector {0}")]
    InvalidSelector(String),
}

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Fetch failed for {date}: {source}")]
    Fetch {
        date: NaiveDate,
        #[source]
        source: FetchError,
    },

    #[error("Extraction failed for {date}: {source}")]
    Extraction {
        date: NaiveDate,
        #[source]
        source: ExtractionError,
    },
}

impl ForecastError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ForecastError::InvalidRange { .. } => "Start date must not be after end date.",
            ForecastError::Fetch { .. } => {
                "Could not download the forecast page. Check your connection."
            }
            ForecastError::Extraction { .. } => {
                "The forecast page layout was not recognized. Nothing was saved for this run."
            }
        }
    }
}
