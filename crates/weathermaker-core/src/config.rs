use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

const APP_DIR: &str = "weathermaker";
const CONFIG_FILE: &str = "config.toml";

/// One problem found in a config field
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Problems found by [`Config::validate`]. Errors block startup, warnings are only logged.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(Self::entry(field, message));
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(Self::entry(field, message));
    }

    /// All errors as `field: message`, separated by `; `. Empty when valid.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn entry(field: impl Into<String>, message: impl Into<String>) -> ConfigValidationError {
        ConfigValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Forecast page provider
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Local forecast database
    #[serde(default)]
    pub storage: StorageConfig,

    /// Postcard rendering
    #[serde(default)]
    pub postcard: PostcardConfig,
}

/// Where the daily details pages come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Scheme and host of the provider, without trailing slash
    pub base_url: String,

    pub latitude: f64,

    pub longitude: f64,

    /// Units/language suffix appended after the date segment
    pub locale_path: String,

    /// HTTP client timeout in seconds (0 disables the timeout)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://darksky.net".to_string(),
            latitude: 46.9651,
            longitude: 142.7393,
            locale_path: "si12/en".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_app_dir().join("forecast.db"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostcardConfig {
    /// Background image the forecast is drawn onto
    pub template_path: PathBuf,

    /// Directory of weather icons; file stems are matched against the condition
    pub icons_dir: PathBuf,

    /// Directory rendered postcards are written to
    pub output_dir: PathBuf,

    /// TrueType/OpenType font for the forecast text (text is skipped without one)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,

    /// Horizontal stretch applied to the template
    #[serde(default = "default_width_scale")]
    pub width_scale: f32,
}

fn default_width_scale() -> f32 {
    1.5
}

impl Default for PostcardConfig {
    fn default() -> Self {
        let base = default_app_dir().join("postcard");
        Self {
            template_path: base.join("template.jpg"),
            icons_dir: base.join("icons"),
            output_dir: PathBuf::from("."),
            font_path: None,
            width_scale: default_width_scale(),
        }
    }
}

fn default_app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, writing defaults there if the file is missing
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config at {}, writing defaults", path.display());
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult), ConfigError> {
        let config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.provider.base_url, "provider.base_url", &mut result);

        if !(-90.0..=90.0).contains(&self.provider.latitude) {
            result.add_error("provider.latitude", "Latitude must be within [-90, 90]");
        }
        if !(-180.0..=180.0).contains(&self.provider.longitude) {
            result.add_error("provider.longitude", "Longitude must be within [-180, 180]");
        }

        if self.provider.locale_path.trim_matches('/').is_empty() {
            result.add_error("provider.locale_path", "Locale path must not be empty");
        }

        if self.provider.timeout_secs == 0 {
            result.add_warning(
                "provider.timeout_secs",
                "Request timeout disabled; a stalled fetch will hang",
            );
        }

        let scale = self.postcard.width_scale;
        if !(scale > 0.0 && scale <= 10.0) {
            result.add_error("postcard.width_scale", "Width scale must be within (0, 10]");
        }

        if !self.postcard.template_path.is_file() {
            result.add_warning(
                "postcard.template_path",
                format!(
                    "Template not found: {}",
                    self.postcard.template_path.display()
                ),
            );
        }

        if !self.postcard.icons_dir.is_dir() {
            result.add_warning(
                "postcard.icons_dir",
                format!(
                    "Icons directory not found: {}",
                    self.postcard.icons_dir.display()
                ),
            );
        }

        match &self.postcard.font_path {
            None => result.add_warning(
                "postcard.font_path",
                "No font configured - postcards will not contain text",
            ),
            Some(font) if !font.is_file() => result.add_error(
                "postcard.font_path",
                format!("Font not found: {}", font.display()),
            ),
            Some(_) => {}
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(APP_DIR).join(CONFIG_FILE))
    }
}
