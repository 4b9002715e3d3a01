//! Per-day summary of the daily forecast.

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{DailyReading, RainStatus};

const UNKNOWN_CONDITION: &str = "unknown";
const NOT_AVAILABLE: &str = "N/A";

/// One day ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub is_today: bool,
    pub condition: String,
    /// Falls back to the low when the provider sends no high
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub wind_speed: Option<f64>,
    pub precipitation: f64,
    pub precipitation_probability: f64,
    pub rain_status: RainStatus,
}

impl DaySummary {
    pub fn from_reading<Tz: TimeZone>(reading: &DailyReading, is_today: bool, tz: &Tz) -> Self {
        Self {
            date: reading.timestamp.with_timezone(tz).date_naive(),
            is_today,
            condition: reading
                .condition
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| UNKNOWN_CONDITION.to_string()),
            high: reading.temperature.or(reading.templow),
            low: reading.templow,
            wind_speed: reading.wind_speed,
            precipitation: reading.precipitation,
            precipitation_probability: reading.precipitation_probability,
            rain_status: RainStatus::from_amounts(
                reading.precipitation,
                reading.precipitation_probability,
            ),
        }
    }
}

fn or_na(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

impl fmt::Display for DaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format("%a, %b %-d"))?;
        if self.is_today {
            f.write_str(" [TODAY]")?;
        }
        writeln!(f, " - {} {}", self.condition, self.rain_status.marker())?;
        write!(
            f,
            "  High: {}° Low: {}° | Wind: {}km/h | Rain: {}mm ({}%)",
            or_na(self.high),
            or_na(self.low),
            or_na(self.wind_speed),
            self.precipitation,
            self.precipitation_probability
        )
    }
}

/// Summaries for the first `days` entries; the first is marked as today
pub fn summarize_days<Tz: TimeZone>(daily: &[DailyReading], days: usize, tz: &Tz) -> Vec<DaySummary> {
    daily
        .iter()
        .take(days)
        .enumerate()
        .map(|(index, reading)| DaySummary::from_reading(reading, index == 0, tz))
        .collect()
}
