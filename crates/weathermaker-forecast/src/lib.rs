//! Forecast retrieval for WeatherMaker
//!
//! Fetches one details page per day, extracts temperature, condition and wind,
//! and normalizes the condition into a small set of categories.

pub mod collector;
pub mod condition;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod types;

pub use collector::{dates_inclusive, CollectorSetupError, ForecastCollector, HttpForecastCollector};
pub use condition::{categorize, normalize_condition};
pub use error::{ExtractionError, FetchError, ForecastError};
pub use extractor::{DetailsPageExtractor, FieldExtractor};
pub use fetcher::{DocumentFetcher, HttpFetcher};
pub use types::*;
