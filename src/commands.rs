//! Command handlers. `main` builds the collaborators and passes them in.

use chrono::{Days, NaiveDate};
use std::io::Write;
use std::path::PathBuf;
use weathermaker_forecast::{DocumentFetcher, FieldExtractor, Forecast, ForecastCollector};
use weathermaker_postcard::PostcardComposer;
use weathermaker_store::ForecastStore;

use crate::cli::OutputFormat;
use crate::error::AppError;

/// Collect `[start, end]` and upsert it. Nothing is written unless every day was collected.
pub async fn store_forecast<F, E>(
    collector: &ForecastCollector<F, E>,
    store: &ForecastStore,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Forecast, AppError>
where
    F: DocumentFetcher,
    E: FieldExtractor,
{
    let forecast = collector.collect(start, end).await?;
    let written = store.upsert_all(forecast.values())?;

    tracing::info!(
        "Stored {} day(s) from {} to {}, {} day(s) in the database",
        written,
        start,
        end,
        store.count()?
    );
    Ok(forecast)
}

/// Print stored records in `[start, end]`, oldest first. Returns how many were printed.
pub fn get_forecast<W: Write>(
    store: &ForecastStore,
    start: NaiveDate,
    end: NaiveDate,
    format: OutputFormat,
    out: &mut W,
) -> Result<usize, AppError> {
    let records = store.query(start, end)?;
    if records.is_empty() {
        tracing::info!("No stored forecasts between {} and {}", start, end);
    }

    match format {
        OutputFormat::Text => {
            for record in &records {
                writeln!(out, "{}", record.console_line())?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &records)?;
            writeln!(out)?;
        }
    }

    Ok(records.len())
}

/// Fetch a single day and render it as `<output_dir>/<name>.png`
pub async fn make_image<F, E>(
    collector: &ForecastCollector<F, E>,
    composer: &PostcardComposer,
    date: NaiveDate,
    name: &str,
) -> Result<PathBuf, AppError>
where
    F: DocumentFetcher,
    E: FieldExtractor,
{
    let record = collector.collect_day(date).await?;
    Ok(composer.render_to_file(&record, name)?)
}

/// Store the `days` days ending at `today`, then print them
pub async fn recent<F, E, W>(
    collector: &ForecastCollector<F, E>,
    store: &ForecastStore,
    today: NaiveDate,
    days: u32,
    out: &mut W,
) -> Result<usize, AppError>
where
    F: DocumentFetcher,
    E: FieldExtractor,
    W: Write,
{
    let start = today
        .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
        .ok_or_else(|| AppError::InvalidDate(format!("{} days before {}", days, today)))?;

    store_forecast(collector, store, start, today).await?;
    get_forecast(store, start, today, OutputFormat::Text, out)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use async_trait::async_trait;
    use weathermaker_core::PostcardConfig;
    use weathermaker_forecast::{
        Condition, DetailsPageExtractor, FetchError, ForecastError, WeatherCategory,
    };
    use weathermaker_store::StoreError;

    /// Serves a details page for every day except `fail_on`
    struct PageFetcher {
        fail_on: Option<NaiveDate>,
    }

    #[async_trait]
    impl DocumentFetcher for PageFetcher {
        fn url_for(&self, date: NaiveDate) -> String {
            format!("stub://{}", date)
        }

        async fn fetch(&self, date: NaiveDate) -> Result<String, FetchError> {
            if self.fail_on == Some(date) {
                return Err(FetchError::Status {
                    status: 503,
                    url: self.url_for(date),
                });
            }
            Ok(format!(
                r#"<div class="temperature"><span class="val swap">1{}°</span></div>
                <p id="summary">Overcast</p>
                <div class="wind"><span class="val swap"><span class="num swip">4</span> <span class="unit swap">m/s</span> <span class="direction" title="SW"></span></span></div>"#,
                date.format("%d").to_string().trim_start_matches('0')
            ))
        }
    }

    type StubCollector = ForecastCollector<PageFetcher, DetailsPageExtractor>;

    fn collector(fail_on: Option<NaiveDate>) -> StubCollector {
        ForecastCollector::new(PageFetcher { fail_on }, DetailsPageExtractor::new().unwrap())
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_store_forecast_upserts_every_day() {
        let store = ForecastStore::in_memory().unwrap();
        let forecast = store_forecast(&collector(None), &store, date("2021-06-01"), date("2021-06-03"))
            .await
            .unwrap();

        assert_eq!(forecast.len(), 3);
        assert_eq!(store.count().unwrap(), 3);

        let stored = store
            .query(date("2021-06-02"), date("2021-06-02"))
            .unwrap()
            .remove(0);
        assert_eq!(stored.temperature, "12deg C");
        assert_eq!(stored.condition, Condition::Category(WeatherCategory::Cloudy));
        assert_eq!(stored.wind, "4 m/s    SW");
    }

    #[tokio::test]
    async fn test_store_forecast_writes_nothing_on_failure() {
        let store = ForecastStore::in_memory().unwrap();
        let result = store_forecast(
            &collector(Some(date("2021-06-03"))),
            &store,
            date("2021-06-01"),
            date("2021-06-04"),
        )
        .await;

        assert!(matches!(
            result,
            Err(AppError::Forecast(ForecastError::Fetch { .. }))
        ));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_store_forecast_reversed_range() {
        let store = ForecastStore::in_memory().unwrap();
        let result =
            store_forecast(&collector(None), &store, date("2021-06-20"), date("2021-06-19")).await;

        assert!(matches!(
            result,
            Err(AppError::Forecast(ForecastError::InvalidRange { .. }))
        ));
    }

    #[tokio::test]
    async fn test_get_forecast_prints_console_lines() {
        let store = ForecastStore::in_memory().unwrap();
        store_forecast(&collector(None), &store, date("2021-06-01"), date("2021-06-02"))
            .await
            .unwrap();

        let mut out = Vec::new();
        let printed =
            get_forecast(&store, date("2021-06-01"), date("2021-06-30"), OutputFormat::Text, &mut out)
                .unwrap();

        assert_eq!(printed, 2);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Date: 2021-06-01     Temperature: 11deg C   Weather condition: Cloudy   Wind: 4 m/s    SW"
        );
        assert!(lines[1].starts_with("Date: 2021-06-02"));
    }

    #[test]
    fn test_get_forecast_empty_range_prints_nothing() {
        let store = ForecastStore::in_memory().unwrap();
        let mut out = Vec::new();

        let printed =
            get_forecast(&store, date("2021-06-02"), date("2021-06-01"), OutputFormat::Text, &mut out)
                .unwrap();

        assert_eq!(printed, 0);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_get_forecast_json() {
        let store = ForecastStore::in_memory().unwrap();
        store_forecast(&collector(None), &store, date("2021-06-01"), date("2021-06-01"))
            .await
            .unwrap();

        let mut out = Vec::new();
        get_forecast(&store, date("2021-06-01"), date("2021-06-01"), OutputFormat::Json, &mut out)
            .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["date"], "2021-06-01");
        assert_eq!(value[0]["condition"], "Cloudy");
        assert_eq!(value[0]["wind"], "4 m/s    SW");
    }

    #[tokio::test]
    async fn test_recent_stores_and_prints_window() {
        let store = ForecastStore::in_memory().unwrap();
        let mut out = Vec::new();

        let printed = recent(&collector(None), &store, date("2021-06-07"), 3, &mut out)
            .await
            .unwrap();

        assert_eq!(printed, 3);
        assert_eq!(store.count().unwrap(), 3);
        assert!(store
            .query(date("2021-06-04"), date("2021-06-04"))
            .unwrap()
            .is_empty());
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().next().unwrap().starts_with("Date: 2021-06-05"));
    }

    #[tokio::test]
    async fn test_recent_window_before_calendar_start() {
        let store = ForecastStore::in_memory().unwrap();
        let mut out = Vec::new();

        let result = recent(&collector(None), &store, NaiveDate::MIN, 2, &mut out).await;

        assert!(matches!(result, Err(AppError::InvalidDate(_))));
        assert_eq!(store.count().unwrap(), 0);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_make_image_fetch_failure_renders_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let composer = PostcardComposer::new(&PostcardConfig {
            template_path: dir.path().join("template.png"),
            icons_dir: dir.path().join("icons"),
            output_dir: dir.path().join("out"),
            font_path: None,
            width_scale: 1.5,
        })
        .unwrap();

        let day = date("2021-06-01");
        let result = make_image(&collector(Some(day)), &composer, day, "Postcard").await;

        assert!(matches!(result, Err(AppError::Forecast(ForecastError::Fetch { .. }))));
        assert!(!dir.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_make_image_without_template() {
        let dir = tempfile::tempdir().unwrap();
        let composer = PostcardComposer::new(&PostcardConfig {
            template_path: dir.path().join("missing.png"),
            icons_dir: dir.path().join("icons"),
            output_dir: dir.path().join("out"),
            font_path: None,
            width_scale: 1.5,
        })
        .unwrap();

        let result = make_image(&collector(None), &composer, date("2021-06-01"), "Postcard").await;
        assert!(matches!(result, Err(AppError::Postcard(_))));
    }

    #[test]
    fn test_store_errors_convert() {
        let err = AppError::from(StoreError::Corrupt("bad".into()));
        assert!(matches!(err, AppError::Store(_)));
    }
}
