//! Home Assistant provider errors.

use thiserror::Error;
use washday_core::{AppError, ConfigError, NetworkError, ReqwestErrorExt, WeatherError};

#[derive(Error, Debug)]
pub enum HassError {
    #[error("No access token configured")]
    MissingToken,

    #[error("Unauthorized - token may be invalid or expired")]
    Unauthorized,

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("No forecast returned for {0}")]
    ForecastMissing(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl HassError {
    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

impl From<HassError> for AppError {
    fn from(e: HassError) -> Self {
        match e {
            HassError::MissingToken => {
                AppError::Config(ConfigError::MissingSetting("home_assistant.token".into()))
            }
            HassError::Unauthorized => AppError::Weather(WeatherError::InvalidToken),
            HassError::EntityNotFound(id) => AppError::Weather(WeatherError::EntityNotFound(id)),
            HassError::Api { status: 503, .. } => {
                AppError::Weather(WeatherError::ServiceUnavailable)
            }
            HassError::Api { status, message } => {
                AppError::Network(NetworkError::ServerError { status, message })
            }
            HassError::ForecastMissing(id) => {
                AppError::Weather(WeatherError::ApiError(format!("no forecast for {id}")))
            }
            HassError::Parse(msg) => AppError::Network(NetworkError::InvalidResponse(msg)),
            HassError::Network(e) => AppError::Network(e.into_network_error()),
        }
    }
}
