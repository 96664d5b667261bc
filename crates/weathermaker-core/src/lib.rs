pub mod config;
pub mod error;

pub use config::{
    Config, ConfigValidationError, PostcardConfig, ProviderConfig, StorageConfig,
    ValidationResult,
};
pub use error::ConfigError;

/// How chatty the log output should be when `RUST_LOG` is not set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

impl Verbosity {
    fn default_filter(self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
        }
    }
}

/// Initialize tracing. Logs go to stderr so command output on stdout stays clean.
pub fn init(verbosity: Verbosity) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(verbosity.default_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("weathermaker core initialized");
}
