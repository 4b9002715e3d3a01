use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Probability above which a day or the current hour counts as "rain likely"
pub const RAIN_LIKELY_PROBABILITY: f64 = 50.0;

/// Forecast granularity requested from the weather entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastKind {
    Hourly,
    Daily,
}

impl ForecastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
        }
    }
}

/// One hourly forecast sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyReading {
    #[serde(rename = "datetime")]
    pub timestamp: DateTime<Utc>,
    /// Chance of precipitation in percent (0-100)
    #[serde(default, deserialize_with = "null_as_zero")]
    pub precipitation_probability: f64,
    /// Expected precipitation amount
    #[serde(default, deserialize_with = "null_as_zero")]
    pub precipitation: f64,
    /// Free-text condition such as "rainy", "cloudy" or "sunny"
    #[serde(default, deserialize_with = "null_as_empty")]
    pub condition: String,
    #[serde(default)]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub wind_bearing: Option<f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
}

impl HourlyReading {
    /// A dry reading with no condition text, for building series
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            precipitation_probability: 0.0,
            precipitation: 0.0,
            condition: String::new(),
            wind_speed: None,
            wind_bearing: None,
            temperature: None,
        }
    }
}

/// Current weather snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub condition: String,
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Relative humidity in percent (0-100)
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub wind_bearing: Option<f64>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub precipitation: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub precipitation_probability: f64,
    #[serde(default = "default_precipitation_unit")]
    pub precipitation_unit: String,
}

fn default_precipitation_unit() -> String {
    "mm".to_string()
}

impl Default for CurrentConditions {
    fn default() -> Self {
        Self {
            condition: String::new(),
            temperature: None,
            humidity: None,
            wind_speed: None,
            wind_bearing: None,
            precipitation: 0.0,
            precipitation_probability: 0.0,
            precipitation_unit: default_precipitation_unit(),
        }
    }
}

impl CurrentConditions {
    /// Whether precipitation is being reported right now or is likely soon
    pub fn rain_status(&self) -> RainStatus {
        RainStatus::from_amounts(self.precipitation, self.precipitation_probability)
    }
}

/// One day of the daily forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReading {
    #[serde(rename = "datetime")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub condition: Option<String>,
    /// Daily high
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub templow: Option<f64>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub precipitation: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub precipitation_probability: f64,
    #[serde(default)]
    pub wind_speed: Option<f64>,
}

/// Coarse rain indicator shown next to current conditions and each day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RainStatus {
    Raining,
    RainLikely,
    NoRain,
}

impl RainStatus {
    /// Measured precipitation wins over probability
    pub fn from_amounts(precipitation: f64, probability: f64) -> Self {
        if precipitation > 0.0 {
            Self::Raining
        } else if probability > RAIN_LIKELY_PROBABILITY {
            Self::RainLikely
        } else {
            Self::NoRain
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Raining => "RAINING",
            Self::RainLikely => "RAIN LIKELY",
            Self::NoRain => "NO RAIN",
        }
    }

    /// Short marker used in the daily summary
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Raining => "[RAIN]",
            Self::RainLikely => "[LIKELY]",
            Self::NoRain => "[DRY]",
        }
    }
}

/// Everything fetched from the weather entity in one pass.
///
/// Either forecast may be empty when its fetch failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherBundle {
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyReading>,
    pub daily: Vec<DailyReading>,
    pub fetched_at: DateTime<Utc>,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rain_status_measured_precipitation_wins() {
        assert_eq!(RainStatus::from_amounts(0.2, 0.0), RainStatus::Raining);
        assert_eq!(RainStatus::from_amounts(0.2, 90.0), RainStatus::Raining);
    }

    #[test]
    fn test_rain_status_probability_is_strictly_above_fifty() {
        assert_eq!(RainStatus::from_amounts(0.0, 50.0), RainStatus::NoRain);
        assert_eq!(RainStatus::from_amounts(0.0, 51.0), RainStatus::RainLikely);
    }

    #[test]
    fn test_rain_status_labels() {
        assert_eq!(RainStatus::Raining.label(), "RAINING");
        assert_eq!(RainStatus::RainLikely.marker(), "[LIKELY]");
        assert_eq!(RainStatus::NoRain.marker(), "[DRY]");
    }

    #[test]
    fn test_hourly_reading_tolerates_nulls_and_missing_fields() {
        let reading: HourlyReading = serde_json::from_value(serde_json::json!({
            "datetime": "2026-06-01T14:00:00+02:00",
            "precipitation_probability": null,
            "condition": null
        }))
        .unwrap();

        assert_eq!(reading.timestamp.to_rfc3339(), "2026-06-01T12:00:00+00:00");
        assert_eq!(reading.precipitation_probability, 0.0);
        assert_eq!(reading.precipitation, 0.0);
        assert_eq!(reading.condition, "");
        assert_eq!(reading.temperature, None);
    }

    #[test]
    fn test_current_conditions_defaults() {
        let current: CurrentConditions = serde_json::from_value(serde_json::json!({
            "condition": "sunny",
            "temperature": 18.5
        }))
        .unwrap();

        assert_eq!(current.condition, "sunny");
        assert_eq!(current.humidity, None);
        assert_eq!(current.precipitation_unit, "mm");
        assert_eq!(current.rain_status(), RainStatus::NoRain);
    }

    #[test]
    fn test_forecast_kind_names() {
        assert_eq!(ForecastKind::Hourly.as_str(), "hourly");
        assert_eq!(
            serde_json::to_value(ForecastKind::Daily).unwrap(),
            serde_json::json!("daily")
        );
    }
}
