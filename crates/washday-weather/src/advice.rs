//! Drying advice from current conditions.
//!
//! Rules are evaluated in a fixed order and the first match wins:
//! ideal, precipitating, high humidity, calm, too windy, marginal.

use serde::{Deserialize, Serialize};
use washday_core::DryingThresholds;

use crate::types::CurrentConditions;

/// Condition substrings that rule out drying outside
const PRECIPITATION_KEYWORDS: [&str; 3] = ["rain", "snow", "storm"];

/// Advice category, in rule evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceCategory {
    Ideal,
    Precipitating,
    HighHumidity,
    Calm,
    TooWindy,
    Marginal,
}

impl AdviceCategory {
    /// Short heading for the category
    pub fn title(&self) -> &'static str {
        match self {
            Self::Ideal => "Great drying day",
            Self::Precipitating => "Dry indoors",
            Self::HighHumidity => "Slow drying",
            Self::Calm => "Slow drying",
            Self::TooWindy => "Too windy",
            Self::Marginal => "Marginal",
        }
    }

    pub fn severity(&self) -> SeverityColor {
        match self {
            Self::Ideal => SeverityColor::Green,
            Self::Precipitating | Self::TooWindy => SeverityColor::Red,
            Self::HighHumidity | Self::Calm | Self::Marginal => SeverityColor::Amber,
        }
    }
}

/// Traffic-light color attached to advice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityColor {
    Green,
    Amber,
    Red,
}

impl SeverityColor {
    pub fn hex(&self) -> &'static str {
        match self {
            Self::Green => "#4caf50",
            Self::Amber => "#ff9800",
            Self::Red => "#f44336",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceResult {
    pub category: AdviceCategory,
    pub message: String,
    pub severity_color: SeverityColor,
}

impl AdviceResult {
    fn new(category: AdviceCategory, message: String) -> Self {
        Self {
            category,
            message,
            severity_color: category.severity(),
        }
    }
}

/// Classify current conditions into a drying recommendation.
///
/// Missing temperature, humidity and wind count as zero; a missing condition
/// counts as empty text. Never fails.
pub fn compute_advice(conditions: &CurrentConditions, thresholds: &DryingThresholds) -> AdviceResult {
    let temperature = conditions.temperature.unwrap_or(0.0);
    let humidity = conditions.humidity.unwrap_or(0.0);
    let wind = conditions.wind_speed.unwrap_or(0.0);
    let condition = conditions.condition.to_lowercase();

    let precipitating = PRECIPITATION_KEYWORDS
        .iter()
        .any(|keyword| condition.contains(keyword));

    let ideal = temperature > thresholds.dry_temperature
        && humidity < thresholds.dry_humidity
        && wind > thresholds.low_wind
        && wind < thresholds.high_wind
        && !precipitating;

    if ideal {
        AdviceResult::new(
            AdviceCategory::Ideal,
            format!(
                "Perfect for the line: {temperature}°, {humidity}% humidity and a {wind} km/h breeze."
            ),
        )
    } else if precipitating {
        AdviceResult::new(
            AdviceCategory::Precipitating,
            format!("It's {condition} outside. Dry your washing indoors today."),
        )
    } else if humidity >= thresholds.dry_humidity {
        AdviceResult::new(
            AdviceCategory::HighHumidity,
            format!("Humidity is {humidity}%. Washing will dry slowly outside."),
        )
    } else if wind <= thresholds.low_wind {
        AdviceResult::new(
            AdviceCategory::Calm,
            "There's no breeze. Washing will take a long time to dry outside.".to_string(),
        )
    } else if wind >= thresholds.high_wind {
        AdviceResult::new(
            AdviceCategory::TooWindy,
            format!("Wind is {wind} km/h. Washing may blow off the line."),
        )
    } else {
        AdviceResult::new(
            AdviceCategory::Marginal,
            "Conditions are only fair. Consider using the dryer.".to_string(),
        )
    }
}
