//! SQLite-backed storage for forecast records.
//!
//! One row per calendar day. Dates are stored as `YYYY-MM-DD` text so that
//! lexical order is chronological order.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use thiserror::Error;
use weathermaker_forecast::{Condition, ForecastRecord};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Could not prepare database location: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn user_message(&self) -> &'static str {
        match self {
            StoreError::Database(_) => "A local data operation failed. Please try again.",
            StoreError::Corrupt(_) => "Local data may be corrupted. Consider resetting the database.",
            StoreError::Io(_) => "The database file could not be created.",
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Forecast storage keyed by date.
pub struct ForecastStore {
    conn: Connection,
}

impl ForecastStore {
    /// Open (or create) the store at `path`, creating parent directories and schema.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        tracing::debug!("Opening forecast store at {}", path.display());
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store.
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> StoreResult<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS forecasts (
                date TEXT PRIMARY KEY,
                temperature TEXT NOT NULL,
                condition TEXT NOT NULL,
                wind TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Insert the record, or replace every field of the existing row for its date.
    ///
    /// Single statement, so a reader never sees a half-updated row.
    pub fn upsert(&self, record: &ForecastRecord) -> StoreResult<()> {
        let now = Utc::now().timestamp_millis();

        self.conn.execute(
            r#"
            INSERT INTO forecasts (date, temperature, condition, wind, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(date) DO UPDATE SET
                temperature = excluded.temperature,
                condition = excluded.condition,
                wind = excluded.wind,
                updated_at = excluded.updated_at
            "#,
            params![
                record.date.format(DATE_FORMAT).to_string(),
                record.temperature,
                record.condition.to_string(),
                record.wind,
                now,
            ],
        )?;

        tracing::debug!("Upserted forecast for {}", record.date);
        Ok(())
    }

    /// Upsert each record on its own. Stops at the first failure; rows already
    /// written stay written. Returns how many records were stored.
    pub fn upsert_all<'a, I>(&self, records: I) -> StoreResult<usize>
    where
        I: IntoIterator<Item = &'a ForecastRecord>,
    {
        let mut written = 0;
        for record in records {
            self.upsert(record)?;
            written += 1;
        }
        Ok(written)
    }

    /// Records with `start <= date <= end`, oldest first. Empty when `start > end`.
    pub fn query(&self, start: NaiveDate, end: NaiveDate) -> StoreResult<Vec<ForecastRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT date, temperature, condition, wind
            FROM forecasts
            WHERE date >= ?1 AND date <= ?2
            ORDER BY date ASC
            "#,
        )?;

        let rows = stmt.query_map(
            params![
                start.format(DATE_FORMAT).to_string(),
                end.format(DATE_FORMAT).to_string()
            ],
            Self::read_row,
        )?;

        let mut records = Vec::new();
        for row in rows {
            records.push(Self::decode(row?)?);
        }
        Ok(records)
    }

    /// Get the record for a single date.
    #[cfg(test)]
    pub fn get(&self, date: NaiveDate) -> StoreResult<Option<ForecastRecord>> {
        use rusqlite::OptionalExtension;

        let row = self
            .conn
            .query_row(
                "SELECT date, temperature, condition, wind FROM forecasts WHERE date = ?1",
                params![date.format(DATE_FORMAT).to_string()],
                Self::read_row,
            )
            .optional()?;

        row.map(Self::decode).transpose()
    }

    /// Number of stored days.
    pub fn count(&self) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM forecasts", [], |row| row.get(0))?;
        usize::try_from(count).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    fn read_row(row: &rusqlite::Row) -> rusqlite::Result<RawRow> {
        Ok(RawRow {
            date: row.get(0)?,
            temperature: row.get(1)?,
            condition: row.get(2)?,
            wind: row.get(3)?,
        })
    }

    fn decode(raw: RawRow) -> StoreResult<ForecastRecord> {
        let date = NaiveDate::parse_from_str(&raw.date, DATE_FORMAT)
            .map_err(|e| StoreError::Corrupt(format!("date {:?}: {}", raw.date, e)))?;

        Ok(ForecastRecord {
            date,
            temperature: raw.temperature,
            condition: Condition::from_stored(&raw.condition),
            wind: raw.wind,
        })
    }
}

struct RawRow {
    date: String,
    temperature: String,
    condition: String,
    wind: String,
}
