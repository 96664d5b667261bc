//! Date-range forecast collection.

use chrono::NaiveDate;
use tracing::instrument;
use weathermaker_core::ProviderConfig;

use crate::condition::normalize_condition;
use crate::error::{ExtractionError, FetchError, ForecastError};
use crate::extractor::{DetailsPageExtractor, FieldExtractor};
use crate::fetcher::{DocumentFetcher, HttpFetcher};
use crate::types::{Forecast, ForecastRecord};

/// Every date from `start` to `end`, inclusive, ascending. Empty when start > end.
pub fn dates_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// Fetches, extracts and normalizes one record per day, strictly in sequence
pub struct ForecastCollector<F, E> {
    fetcher: F,
    extractor: E,
}

/// Collector wired to the real provider
pub type HttpForecastCollector = ForecastCollector<HttpFetcher, DetailsPageExtractor>;

/// Why a collector could not be built from config
#[derive(Debug, thiserror::Error)]
pub enum CollectorSetupError {
    #[error(transparent)]
    Fetcher(#[from] FetchError),
    #[error(transparent)]
    Extractor(#[from] ExtractionError),
}

impl HttpForecastCollector {
    pub fn from_config(config: &ProviderConfig) -> Result<Self, CollectorSetupError> {
        Ok(Self::new(HttpFetcher::new(config)?, DetailsPageExtractor::new()?))
    }
}

impl<F: DocumentFetcher, E: FieldExtractor> ForecastCollector<F, E> {
    pub fn new(fetcher: F, extractor: E) -> Self {
        Self { fetcher, extractor }
    }

    /// Collect every day in `[start, end]`.
    ///
    /// Fails with `InvalidRange` before any request when `start > end`. The first
    /// failing day aborts the run and no partial mapping is returned.
    #[instrument(skip(self), level = "info")]
    pub async fn collect(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Forecast, ForecastError> {
        if start > end {
            return Err(ForecastError::InvalidRange { start, end });
        }

        let mut forecast = Forecast::new();
        for date in dates_inclusive(start, end) {
            let record = self.collect_day(date).await?;
            forecast.insert(date, record);
        }

        tracing::info!("Collected {} day(s) from {} to {}", forecast.len(), start, end);
        Ok(forecast)
    }

    /// Fetch and parse a single day
    pub async fn collect_day(&self, date: NaiveDate) -> Result<ForecastRecord, ForecastError> {
        tracing::debug!("Collecting forecast for {}", date);

        let document = self
            .fetcher
            .fetch(date)
            .await
            .map_err(|source| ForecastError::Fetch { date, source })?;

        let fields = self
            .extractor
            .extract(&document)
            .map_err(|source| ForecastError::Extraction { date, source })?;

        Ok(ForecastRecord {
            date,
            temperature: fields.temperature,
            condition: normalize_condition(&fields.condition_text),
            wind: fields.wind,
        })
    }
}
