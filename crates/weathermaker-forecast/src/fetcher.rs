//! Details page retrieval.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use std::time::Duration;
use tracing::instrument;
use weathermaker_core::ProviderConfig;

use crate::error::FetchError;

const USER_AGENT: &str = "WeatherMaker/0.1.0";

/// Source of one raw document per calendar day.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// URL the document for `date` is read from.
    fn url_for(&self, date: NaiveDate) -> String;

    /// Fetch the document for `date`. No retries: any failure is returned as-is.
    async fn fetch(&self, date: NaiveDate) -> Result<String, FetchError>;
}

/// Fetches the provider's per-day details page over HTTP
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: String,
    latitude: f64,
    longitude: f64,
    locale_path: String,
}

impl HttpFetcher {
    pub fn new(config: &ProviderConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            latitude: config.latitude,
            longitude: config.longitude,
            locale_path: config.locale_path.trim_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    fn url_for(&self, date: NaiveDate) -> String {
        format!(
            "{}/details/{},{}/{}/{}",
            self.base_url,
            self.latitude,
            self.longitude,
            date.format("%Y-%m-%d"),
            self.locale_path
        )
    }

    #[instrument(skip(self), level = "debug")]
    async fn fetch(&self, date: NaiveDate) -> Result<String, FetchError> {
        let url = self.url_for(date);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}
