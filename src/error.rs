use thiserror::Error;
use weathermaker_core::ConfigError;
use weathermaker_forecast::{CollectorSetupError, ForecastError};
use weathermaker_postcard::PostcardError;
use weathermaker_store::StoreError;

/// Everything a command can fail with
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Setup(#[from] CollectorSetupError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Postcard(#[from] PostcardError),

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

impl AppError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Setup(_) => "The forecast client could not be initialized.",
            AppError::Forecast(e) => e.user_message(),
            AppError::Store(e) => e.user_message(),
            AppError::Postcard(e) => e.user_message(),
            AppError::Output(_) => "Output could not be written.",
            AppError::Json(_) => "Forecast could not be encoded as JSON.",
            AppError::InvalidDate(_) => "The requested date is outside the supported calendar range.",
        }
    }
}
