//! Everything the presentation layer needs, computed in one call.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use washday_core::Config;

use crate::advice::{compute_advice, AdviceResult};
use crate::daily::{summarize_days, DaySummary};
use crate::types::{CurrentConditions, RainStatus, WeatherBundle};
use crate::windows::{compute_windows_in, WindowReport};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WashdayReport {
    pub generated_at: DateTime<Utc>,
    pub current: CurrentConditions,
    pub advice: AdviceResult,
    pub rain_status: RainStatus,
    /// Windows that have not ended yet
    pub windows: WindowReport,
    pub daily: Vec<DaySummary>,
}

impl WashdayReport {
    /// Build the report against the host's local clock
    pub fn build(bundle: &WeatherBundle, now: DateTime<Utc>, config: &Config) -> Self {
        Self::build_in(bundle, now, config, &Local)
    }

    pub fn build_in<Tz: TimeZone>(
        bundle: &WeatherBundle,
        now: DateTime<Utc>,
        config: &Config,
        tz: &Tz,
    ) -> Self {
        let advice = compute_advice(&bundle.current, &config.thresholds);
        let windows =
            compute_windows_in(&bundle.hourly, now, &config.windows, tz).relevant_at(now, tz);
        let daily = summarize_days(&bundle.daily, config.forecast.daily_days, tz);

        tracing::info!(
            category = ?advice.category,
            dry = windows.dry_windows.len(),
            rain = windows.rain_windows.len(),
            "Report ready"
        );

        Self {
            generated_at: now,
            current: bundle.current.clone(),
            advice,
            rain_status: bundle.current.rain_status(),
            windows,
            daily,
        }
    }

    /// Drop windows that ended since the report was built
    pub fn still_relevant_at<Tz: TimeZone>(&self, now: DateTime<Utc>, tz: &Tz) -> Self {
        Self {
            windows: self.windows.relevant_at(now, tz),
            ..self.clone()
        }
    }
}

fn or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

fn join_or_none(labels: &[String]) -> String {
    if labels.is_empty() {
        "none".to_string()
    } else {
        labels.join(", ")
    }
}

impl fmt::Display for WashdayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.current;

        writeln!(f, "{}: {}", self.advice.category.title(), self.advice.message)?;
        writeln!(f)?;
        writeln!(f, "Current: {} - {}°", c.condition, or_na(c.temperature))?;
        writeln!(
            f,
            "Rain: {} ({}{}, {}%)",
            self.rain_status.label(),
            c.precipitation,
            c.precipitation_unit,
            c.precipitation_probability
        )?;
        writeln!(f, "Wind: {} km/h", or_na(c.wind_speed))?;
        writeln!(f, "Humidity: {}%", or_na(c.humidity))?;
        writeln!(f)?;

        match &self.windows.message {
            Some(message) => writeln!(f, "Drying windows: {message}")?,
            None => {
                writeln!(f, "Dry: {}", join_or_none(&self.windows.dry_labels()))?;
                writeln!(f, "Rain: {}", join_or_none(&self.windows.rain_labels()))?;
            }
        }

        if self.daily.is_empty() {
            write!(f, "\nNo forecast data available")?;
        } else {
            write!(f, "\nDaily Forecast:")?;
            for day in &self.daily {
                write!(f, "\n{day}")?;
            }
        }

        Ok(())
    }
}
