use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable consulted when no token is stored in the config file
pub const TOKEN_ENV_VAR: &str = "HASS_TOKEN";

pub const DEFAULT_DRY_TEMPERATURE: f64 = 15.0;
pub const DEFAULT_DRY_HUMIDITY: f64 = 70.0;
pub const DEFAULT_LOW_WIND: f64 = 0.0;
pub const DEFAULT_HIGH_WIND: f64 = 40.0;

pub const DEFAULT_DAYTIME_START_HOUR: u32 = 7;
pub const DEFAULT_DAYTIME_END_HOUR: u32 = 19;
pub const DEFAULT_RAIN_PROBABILITY: f64 = 30.0;
pub const DEFAULT_WASHOUT_RATIO: f64 = 0.7;
pub const DEFAULT_BRIEF_RAIN_MAX_HOURS: usize = 2;
pub const DEFAULT_REST_OF_DAY_MIN_HOURS: usize = 6;

/// Configuration validation errors
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

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Home Assistant connection
    #[serde(default)]
    pub home_assistant: HomeAssistantConfig,

    /// Drying advice thresholds
    #[serde(default)]
    pub thresholds: DryingThresholds,

    /// Dry/rain window rules
    #[serde(default)]
    pub windows: WindowRules,

    /// Daily forecast display
    #[serde(default)]
    pub forecast: ForecastConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeAssistantConfig {
    /// Base URL of the Home Assistant instance
    pub base_url: String,

    /// Long-lived access token. Falls back to `HASS_TOKEN` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Weather entity to read
    pub entity_id: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HomeAssistantConfig {
    fn default() -> Self {
        Self {
            base_url: "http://homeassistant.local:8123".to_string(),
            token: None,
            entity_id: "weather.forecast_home".to_string(),
            timeout_secs: 10,
        }
    }
}

impl HomeAssistantConfig {
    /// Token from the config file, else from the environment
    pub fn effective_token(&self) -> Option<String> {
        self.token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var(TOKEN_ENV_VAR).ok().filter(|t| !t.is_empty()))
    }
}

/// Thresholds used by the drying advice rules.
///
/// Temperature in degrees, humidity in percent, wind in km/h.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DryingThresholds {
    /// Temperature must be strictly above this for ideal drying
    pub dry_temperature: f64,
    /// Humidity must be strictly below this for ideal drying
    pub dry_humidity: f64,
    /// Wind at or below this is too calm
    pub low_wind: f64,
    /// Wind at or above this is too strong
    pub high_wind: f64,
}

impl Default for DryingThresholds {
    fn default() -> Self {
        Self {
            dry_temperature: DEFAULT_DRY_TEMPERATURE,
            dry_humidity: DEFAULT_DRY_HUMIDITY,
            low_wind: DEFAULT_LOW_WIND,
            high_wind: DEFAULT_HIGH_WIND,
        }
    }
}

/// Rules for classifying hours and collapsing them into windows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowRules {
    /// First local hour counted as daytime (inclusive)
    pub daytime_start_hour: u32,
    /// Local hour at which daytime ends (exclusive)
    pub daytime_end_hour: u32,
    /// An hour with precipitation probability above this is rainy
    pub rain_probability: f64,
    /// Share of rainy hours at which the day counts as a washout
    pub washout_ratio: f64,
    /// Up to this many rainy hours are reported as a brief shower
    pub brief_rain_max_hours: usize,
    /// More than this many dry hours left reads as "Rest of the day"
    pub rest_of_day_min_hours: usize,
}

impl Default for WindowRules {
    fn default() -> Self {
        Self {
            daytime_start_hour: DEFAULT_DAYTIME_START_HOUR,
            daytime_end_hour: DEFAULT_DAYTIME_END_HOUR,
            rain_probability: DEFAULT_RAIN_PROBABILITY,
            washout_ratio: DEFAULT_WASHOUT_RATIO,
            brief_rain_max_hours: DEFAULT_BRIEF_RAIN_MAX_HOURS,
            rest_of_day_min_hours: DEFAULT_REST_OF_DAY_MIN_HOURS,
        }
    }
}

impl WindowRules {
    /// Whether a local hour-of-day falls inside the daytime range
    pub fn is_daytime_hour(&self, hour: u32) -> bool {
        hour >= self.daytime_start_hour && hour < self.daytime_end_hour
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Number of days shown in the daily forecast summary
    pub daily_days: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self { daily_days: 7 }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No config at {}, writing defaults", path.display());
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        Self::load_validated_from(&Self::config_path()?)
    }

    /// Load configuration from `path` and validate it
    pub fn load_validated_from(path: &Path) -> Result<(Self, ValidationResult)> {
        let config = Self::load_from(path)?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(
            &self.home_assistant.base_url,
            "home_assistant.base_url",
            &mut result,
        );

        if !self.home_assistant.entity_id.starts_with("weather.") {
            result.add_error(
                "home_assistant.entity_id",
                format!(
                    "Expected a weather entity (weather.*), got: {}",
                    self.home_assistant.entity_id
                ),
            );
        }

        if self.home_assistant.timeout_secs == 0 {
            result.add_error("home_assistant.timeout_secs", "Timeout must be greater than 0");
        }

        if self.home_assistant.effective_token().is_none() {
            result.add_warning(
                "home_assistant.token",
                format!("No access token configured and {} is not set", TOKEN_ENV_VAR),
            );
        }

        self.validate_thresholds(&mut result);
        self.validate_windows(&mut result);

        if self.forecast.daily_days == 0 {
            result.add_warning("forecast.daily_days", "Daily forecast summary disabled (0 days)");
        }

        result
    }

    fn validate_thresholds(&self, result: &mut ValidationResult) {
        let t = &self.thresholds;

        if !(0.0..=100.0).contains(&t.dry_humidity) {
            result.add_error("thresholds.dry_humidity", "Humidity must be within 0-100");
        }

        if t.low_wind < 0.0 {
            result.add_error("thresholds.low_wind", "Wind speed cannot be negative");
        }

        if t.high_wind <= t.low_wind {
            result.add_error(
                "thresholds.high_wind",
                format!(
                    "High wind ({}) must be greater than low wind ({})",
                    t.high_wind, t.low_wind
                ),
            );
        }
    }

    fn validate_windows(&self, result: &mut ValidationResult) {
        let w = &self.windows;

        if w.daytime_end_hour > 24 {
            result.add_error("windows.daytime_end_hour", "Hour must be 24 or less");
        }

        if w.daytime_start_hour >= w.daytime_end_hour {
            result.add_error(
                "windows.daytime_start_hour",
                "Daytime must start before it ends",
            );
        }

        if !(0.0..=100.0).contains(&w.rain_probability) {
            result.add_error("windows.rain_probability", "Probability must be within 0-100");
        }

        if !(w.washout_ratio > 0.0 && w.washout_ratio <= 1.0) {
            result.add_error("windows.washout_ratio", "Ratio must be within (0, 1]");
        }

        if w.brief_rain_max_hours == 0 {
            result.add_warning(
                "windows.brief_rain_max_hours",
                "Brief shower summaries disabled (0 hours)",
            );
        }
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

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("washday");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_token() -> Config {
        let mut config = Config::default();
        config.home_assistant.token = Some("abc".to_string());
        config
    }

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        // Missing token is only a warning
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_default_thresholds() {
        let t = DryingThresholds::default();
        assert_eq!(t.dry_temperature, 15.0);
        assert_eq!(t.dry_humidity, 70.0);
        assert_eq!(t.low_wind, 0.0);
        assert_eq!(t.high_wind, 40.0);
    }

    #[test]
    fn test_invalid_url() {
        let mut config = with_token();
        config.home_assistant.base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "home_assistant.base_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = with_token();
        config.home_assistant.base_url = "ftp://homeassistant.local".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_non_weather_entity_rejected() {
        let mut config = with_token();
        config.home_assistant.entity_id = "sensor.outdoor_temp".to_string();
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "home_assistant.entity_id"));
    }

    #[test]
    fn test_wind_thresholds_must_be_ordered() {
        let mut config = with_token();
        config.thresholds.high_wind = 0.0;
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "thresholds.high_wind"));
    }

    #[test]
    fn test_daytime_range_must_be_ordered() {
        let mut config = with_token();
        config.windows.daytime_start_hour = 20;
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "windows.daytime_start_hour"));
    }

    #[test]
    fn test_washout_ratio_bounds() {
        let mut config = with_token();
        config.windows.washout_ratio = 0.0;
        assert!(!config.validate().is_valid());
        config.windows.washout_ratio = 1.0;
        assert!(config.validate().is_valid());
    }

    #[test]
    fn test_daytime_hours() {
        let rules = WindowRules::default();
        assert!(!rules.is_daytime_hour(6));
        assert!(rules.is_daytime_hour(7));
        assert!(rules.is_daytime_hour(18));
        assert!(!rules.is_daytime_hour(19));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [home_assistant]
            base_url = "https://ha.example.com"

            [thresholds]
            high_wind = 35.0
            "#,
        )
        .unwrap();
        assert_eq!(config.home_assistant.base_url, "https://ha.example.com");
        assert_eq!(config.home_assistant.entity_id, "weather.forecast_home");
        assert_eq!(config.thresholds.high_wind, 35.0);
        assert_eq!(config.thresholds.dry_temperature, 15.0);
        assert_eq!(config.windows, WindowRules::default());
        assert_eq!(config.forecast.daily_days, 7);
    }

    #[test]
    fn test_load_writes_defaults_then_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("washday").join("config.toml");

        let created = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created.home_assistant.entity_id, "weather.forecast_home");

        let mut edited = created.clone();
        edited.windows.rain_probability = 40.0;
        edited.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.windows.rain_probability, 40.0);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[thresholds\nhigh_wind = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_invalid_file_fails_validated_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[windows]\ndaytime_start_hour = 20\n").unwrap();

        let err = Config::load_validated_from(&path).unwrap_err();
        assert!(
            matches!(
                err.downcast_ref::<ConfigError>(),
                Some(ConfigError::Invalid(summary)) if summary.contains("windows.daytime_start_hour")
            ),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
