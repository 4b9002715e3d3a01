//! Dry and rain windows over the remaining daytime hours.
//!
//! Hours are filtered to the rest of today's daytime, classified once, then
//! summarized by the first applicable tier:
//!
//! 1. no rain: one dry window for the rest of the day
//! 2. a brief shower: the shower's time plus a generic dry window
//! 3. a washout: generic rain window plus brief dry periods if any
//! 4. otherwise: exact alternating runs covering the whole range

use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use washday_core::WindowRules;

use crate::clock::{format_clock, on_the_hour};
use crate::types::HourlyReading;

/// Condition substrings that mark an hour as rainy
const RAIN_KEYWORDS: [&str; 3] = ["rain", "storm", "drizzle"];

pub const REST_OF_DAY: &str = "Rest of the day";
pub const MOST_DAYLIGHT_HOURS: &str = "Most remaining daylight hours";
pub const BRIEF_DRY_PERIODS: &str = "Brief dry periods";

pub const NO_FORECAST_MESSAGE: &str = "Hourly forecast not available";
pub const NO_DAYTIME_HOURS_MESSAGE: &str = "No future daytime hours left in the forecast";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    Dry,
    Rain,
}

impl WindowKind {
    fn from_rainy(is_rainy: bool) -> Self {
        if is_rainy {
            Self::Rain
        } else {
            Self::Dry
        }
    }
}

/// What a window covers, kept structured until display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WindowLabel {
    /// Descriptive phrase with no exact bounds
    Generic { text: String },
    /// A single forecast hour
    At { time: NaiveTime },
    /// From `start` until `end`
    Range { start: NaiveTime, end: NaiveTime },
}

impl WindowLabel {
    pub fn generic(text: impl Into<String>) -> Self {
        Self::Generic { text: text.into() }
    }
}

impl fmt::Display for WindowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic { text } => f.write_str(text),
            Self::At { time } => f.write_str(&format_clock(*time)),
            Self::Range { start, end } => {
                write!(f, "{} - {}", format_clock(*start), format_clock(*end))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub kind: WindowKind,
    pub label: WindowLabel,
}

impl Window {
    pub fn new(kind: WindowKind, label: WindowLabel) -> Self {
        Self { kind, label }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.label, f)
    }
}

/// Result of a window calculation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowReport {
    pub dry_windows: Vec<Window>,
    pub rain_windows: Vec<Window>,
    /// Set when there was nothing to summarize
    pub message: Option<String>,
}

impl WindowReport {
    fn with_message(message: &str) -> Self {
        Self {
            message: Some(message.to_string()),
            ..Self::default()
        }
    }

    fn push(&mut self, window: Window) {
        match window.kind {
            WindowKind::Dry => self.dry_windows.push(window),
            WindowKind::Rain => self.rain_windows.push(window),
        }
    }

    pub fn dry_labels(&self) -> Vec<String> {
        self.dry_windows.iter().map(ToString::to_string).collect()
    }

    pub fn rain_labels(&self) -> Vec<String> {
        self.rain_windows.iter().map(ToString::to_string).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.dry_windows.is_empty() && self.rain_windows.is_empty()
    }
}

/// A filtered hour with its classification and local clock time
#[derive(Debug, Clone)]
pub struct ClassifiedHour<'a> {
    pub reading: &'a HourlyReading,
    pub time: NaiveTime,
    pub is_rainy: bool,
}

impl ClassifiedHour<'_> {
    pub fn display_time(&self) -> String {
        format_clock(self.time)
    }
}

/// Whether a single hour counts as rainy
pub fn is_rainy_hour(reading: &HourlyReading, rules: &WindowRules) -> bool {
    let condition = reading.condition.to_lowercase();
    reading.precipitation_probability > rules.rain_probability
        || reading.precipitation > 0.0
        || RAIN_KEYWORDS.iter().any(|keyword| condition.contains(keyword))
}

/// Keep today's remaining daytime hours and classify each one.
///
/// "Today" is the local date of `now` in `tz`; later days in the series are
/// dropped. `hourly` must already be sorted by timestamp.
pub fn classify_hours<'a, Tz: TimeZone>(
    hourly: &'a [HourlyReading],
    now: DateTime<Utc>,
    rules: &WindowRules,
    tz: &Tz,
) -> Vec<ClassifiedHour<'a>> {
    let today = now.with_timezone(tz).date_naive();

    hourly
        .iter()
        .filter(|reading| reading.timestamp > now)
        .filter_map(|reading| {
            let local = reading.timestamp.with_timezone(tz);
            if local.date_naive() != today {
                return None;
            }
            let time = local.time();
            rules.is_daytime_hour(time.hour()).then(|| ClassifiedHour {
                reading,
                time,
                is_rainy: is_rainy_hour(reading, rules),
            })
        })
        .collect()
}

/// Summarize the hourly forecast into dry and rain windows using the host's
/// local clock.
pub fn compute_windows(
    hourly: &[HourlyReading],
    now: DateTime<Utc>,
    rules: &WindowRules,
) -> WindowReport {
    compute_windows_in(hourly, now, rules, &Local)
}

/// Summarize the hourly forecast into dry and rain windows, reading hours of
/// day in `tz`.
pub fn compute_windows_in<Tz: TimeZone>(
    hourly: &[HourlyReading],
    now: DateTime<Utc>,
    rules: &WindowRules,
    tz: &Tz,
) -> WindowReport {
    if hourly.is_empty() {
        return WindowReport::with_message(NO_FORECAST_MESSAGE);
    }

    let hours = classify_hours(hourly, now, rules, tz);
    let (Some(first), Some(last)) = (hours.first(), hours.last()) else {
        return WindowReport::with_message(NO_DAYTIME_HOURS_MESSAGE);
    };

    let total = hours.len();
    let rainy = hours.iter().filter(|h| h.is_rainy).count();
    let dry = total - rainy;
    let end = end_of_range(last.time, rules);

    tracing::debug!(total, rainy, dry, "Classified daytime hours");

    let mut report = WindowReport::default();

    if rainy == 0 {
        let label = if total > rules.rest_of_day_min_hours {
            WindowLabel::generic(REST_OF_DAY)
        } else {
            WindowLabel::Range {
                start: first.time,
                end,
            }
        };
        report.push(Window::new(WindowKind::Dry, label));
    } else if rainy <= rules.brief_rain_max_hours {
        let mut rainy_times = hours.iter().filter(|h| h.is_rainy).map(|h| h.time);
        let label = match (rainy_times.next(), rainy_times.last()) {
            (Some(start), Some(end)) => WindowLabel::Range { start, end },
            (Some(time), None) => WindowLabel::At { time },
            // rainy > 0
            (None, _) => WindowLabel::generic(MOST_DAYLIGHT_HOURS),
        };
        report.push(Window::new(WindowKind::Rain, label));
        report.push(Window::new(
            WindowKind::Dry,
            WindowLabel::generic(MOST_DAYLIGHT_HOURS),
        ));
    } else if (rainy as f64) >= rules.washout_ratio * (total as f64) {
        report.push(Window::new(
            WindowKind::Rain,
            WindowLabel::generic(MOST_DAYLIGHT_HOURS),
        ));
        if dry > 0 {
            report.push(Window::new(
                WindowKind::Dry,
                WindowLabel::generic(BRIEF_DRY_PERIODS),
            ));
        }
    } else {
        for window in enumerate_runs(&hours, end) {
            report.push(window);
        }
    }

    report
}

/// Collapse classified hours into alternating runs. Each run ends where the
/// next begins; the final run ends at `end`.
fn enumerate_runs(hours: &[ClassifiedHour<'_>], end: NaiveTime) -> Vec<Window> {
    let Some((first, rest)) = hours.split_first() else {
        return Vec::new();
    };

    let mut windows = Vec::new();
    let mut run_start = first.time;
    let mut run_rainy = first.is_rainy;

    for hour in rest {
        if hour.is_rainy != run_rainy {
            windows.push(Window::new(
                WindowKind::from_rainy(run_rainy),
                WindowLabel::Range {
                    start: run_start,
                    end: hour.time,
                },
            ));
            run_start = hour.time;
            run_rainy = hour.is_rainy;
        }
    }

    windows.push(Window::new(
        WindowKind::from_rainy(run_rainy),
        WindowLabel::Range {
            start: run_start,
            end,
        },
    ));

    windows
}

/// The hour after the last reading; the last daytime hour always closes at
/// the end of daytime.
fn end_of_range(last: NaiveTime, rules: &WindowRules) -> NaiveTime {
    if last.hour() + 1 == rules.daytime_end_hour {
        on_the_hour(rules.daytime_end_hour)
    } else {
        last.overflowing_add_signed(Duration::hours(1)).0
    }
}
