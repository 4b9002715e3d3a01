//! Home Assistant REST client for a single weather entity.

use chrono::Utc;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use washday_core::HomeAssistantConfig;

use crate::error::HassError;
use crate::retry::{with_retry, RetryConfig};
use crate::types::{CurrentConditions, DailyReading, ForecastKind, HourlyReading, WeatherBundle};

/// `GET /api/states/<entity>` body
#[derive(Debug, Deserialize)]
struct StateResponse {
    state: String,
    #[serde(default)]
    attributes: StateAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct StateAttributes {
    temperature: Option<f64>,
    humidity: Option<f64>,
    wind_speed: Option<f64>,
    wind_bearing: Option<f64>,
    precipitation: Option<f64>,
    precipitation_probability: Option<f64>,
    precipitation_unit: Option<String>,
    /// Older integrations still publish the daily forecast here
    #[serde(default)]
    forecast: Option<Vec<DailyReading>>,
}

/// `POST /api/services/weather/get_forecasts?return_response` body
#[derive(Debug, Deserialize)]
struct ServiceResponse<T> {
    service_response: HashMap<String, ForecastEnvelope<T>>,
}

#[derive(Debug, Deserialize)]
struct ForecastEnvelope<T> {
    #[serde(default = "Vec::new")]
    forecast: Vec<T>,
}

impl StateResponse {
    fn into_parts(self) -> (CurrentConditions, Vec<DailyReading>) {
        let attrs = self.attributes;
        let current = CurrentConditions {
            condition: self.state,
            temperature: attrs.temperature,
            humidity: attrs.humidity,
            wind_speed: attrs.wind_speed,
            wind_bearing: attrs.wind_bearing,
            precipitation: attrs.precipitation.unwrap_or(0.0),
            precipitation_probability: attrs.precipitation_probability.unwrap_or(0.0),
            precipitation_unit: attrs.precipitation_unit.unwrap_or_else(|| "mm".to_string()),
        };
        (current, attrs.forecast.unwrap_or_default())
    }
}

#[derive(Debug, Clone)]
pub struct HassClient {
    client: Client,
    base_url: String,
    token: String,
    entity_id: String,
    retry: RetryConfig,
}

impl HassClient {
    /// Build a client from config, resolving the token from the environment
    /// when the file has none.
    pub fn new(config: &HomeAssistantConfig) -> Result<Self, HassError> {
        let token = config.effective_token().ok_or(HassError::MissingToken)?;
        Self::with_token(
            &config.base_url,
            token,
            &config.entity_id,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn with_token(
        base_url: &str,
        token: impl Into<String>,
        entity_id: &str,
        timeout: Duration,
    ) -> Result<Self, HassError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            entity_id: entity_id.to_string(),
            retry: RetryConfig::default(),
        })
    }

    /// Override the retry policy
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// Read the entity state as current conditions
    pub async fn fetch_current(&self) -> Result<CurrentConditions, HassError> {
        Ok(self.fetch_state().await?.into_parts().0)
    }

    async fn fetch_state(&self) -> Result<StateResponse, HassError> {
        let url = format!("{}/api/states/{}", self.base_url, self.entity_id);

        let response = with_retry(&self.retry, || {
            self.client.get(&url).bearer_auth(&self.token).send()
        })
        .await?;

        self.parse_json(response).await
    }

    pub async fn fetch_hourly(&self) -> Result<Vec<HourlyReading>, HassError> {
        self.fetch_forecast(ForecastKind::Hourly).await
    }

    pub async fn fetch_daily(&self) -> Result<Vec<DailyReading>, HassError> {
        self.fetch_forecast(ForecastKind::Daily).await
    }

    /// Call `weather.get_forecasts` for this entity
    pub async fn fetch_forecast<T: DeserializeOwned>(
        &self,
        kind: ForecastKind,
    ) -> Result<Vec<T>, HassError> {
        let url = format!(
            "{}/api/services/weather/get_forecasts?return_response",
            self.base_url
        );
        let body = serde_json::json!({
            "entity_id": self.entity_id,
            "type": kind.as_str(),
        });

        let response = with_retry(&self.retry, || {
            self.client
                .post(&url)
                .bearer_auth(&self.token)
                .json(&body)
                .send()
        })
        .await?;

        let parsed: ServiceResponse<T> = self.parse_json(response).await?;
        let envelope = parsed
            .service_response
            .into_iter()
            .find_map(|(id, envelope)| (id == self.entity_id).then_some(envelope))
            .ok_or_else(|| HassError::ForecastMissing(self.entity_id.clone()))?;

        tracing::info!(
            "Fetched {} {} forecast entries for {}",
            envelope.forecast.len(),
            kind.as_str(),
            self.entity_id
        );
        Ok(envelope.forecast)
    }

    /// Fetch current conditions plus both forecasts.
    ///
    /// The forecasts are requested concurrently and either may fail without
    /// failing the bundle; a failed forecast comes back empty. When the daily
    /// service call yields nothing, the legacy `forecast` attribute is used.
    pub async fn fetch_bundle(&self) -> Result<WeatherBundle, HassError> {
        let (state, hourly, daily) = tokio::join!(
            self.fetch_state(),
            self.fetch_hourly(),
            self.fetch_daily()
        );

        let (current, legacy_daily) = state?.into_parts();

        let hourly = hourly.unwrap_or_else(|e| {
            tracing::warn!(retryable = e.is_retryable(), "Hourly forecast unavailable: {}", e);
            Vec::new()
        });

        let daily = match daily {
            Ok(days) if !days.is_empty() => days,
            Ok(_) => legacy_daily,
            Err(e) => {
                tracing::warn!(retryable = e.is_retryable(), "Daily forecast unavailable: {}", e);
                legacy_daily
            }
        };

        Ok(WeatherBundle {
            current,
            hourly,
            daily,
            fetched_at: Utc::now(),
        })
    }

    async fn parse_json<T: DeserializeOwned>(&self, response: Response) -> Result<T, HassError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(HassError::Unauthorized);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(HassError::EntityNotFound(self.entity_id.clone()));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(HassError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| HassError::Parse(e.to_string()))
    }
}
