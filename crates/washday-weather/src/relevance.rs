//! Decide whether a computed window is still worth showing.
//!
//! Generic phrases always stay. A range stays until its end time has passed
//! and a single hour stays until that hour is over. Labels that cannot be
//! read are kept.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};

use crate::clock::{minutes_since_midnight, parse_clock};
use crate::windows::{Window, WindowLabel, WindowReport};

/// Prefixes of the descriptive labels produced by the window calculator
const GENERIC_PREFIXES: [&str; 3] = ["Rest of", "Most remaining", "Brief "];

const MINUTES_PER_DAY: u32 = 24 * 60;

impl WindowLabel {
    /// Whether the label still describes something at or after `now` (local)
    pub fn is_relevant_at_time(&self, now: NaiveTime) -> bool {
        match self {
            Self::Generic { .. } => true,
            Self::At { time } => {
                let end_minutes = (minutes_since_midnight(*time) + 60).min(MINUTES_PER_DAY);
                end_minutes > minutes_since_midnight(now)
            }
            Self::Range { start, end } => {
                let end_minutes = if end <= start {
                    // closes at or after midnight
                    MINUTES_PER_DAY
                } else {
                    minutes_since_midnight(*end)
                };
                end_minutes > minutes_since_midnight(now)
            }
        }
    }

    /// Read a rendered label back into its structured form
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();

        if GENERIC_PREFIXES.iter().any(|p| label.starts_with(p)) {
            return Some(Self::generic(label));
        }

        match label.split_once(" - ") {
            Some((start, end)) => Some(Self::Range {
                start: parse_clock(start)?,
                end: parse_clock(end)?,
            }),
            None => parse_clock(label).map(|time| Self::At { time }),
        }
    }
}

impl Window {
    /// Whether the window is still relevant at `now`, reading clock times in `tz`
    pub fn is_relevant_at<Tz: TimeZone>(&self, now: DateTime<Utc>, tz: &Tz) -> bool {
        self.label.is_relevant_at_time(now.with_timezone(tz).time())
    }
}

impl WindowReport {
    /// Copy of the report without windows that have already ended
    pub fn relevant_at<Tz: TimeZone>(&self, now: DateTime<Utc>, tz: &Tz) -> WindowReport {
        let keep = |windows: &[Window]| -> Vec<Window> {
            windows
                .iter()
                .filter(|w| w.is_relevant_at(now, tz))
                .cloned()
                .collect()
        };

        WindowReport {
            dry_windows: keep(&self.dry_windows),
            rain_windows: keep(&self.rain_windows),
            message: self.message.clone(),
        }
    }
}

/// String-level relevance check for labels held only in rendered form.
///
/// Fails open: anything unparseable is treated as relevant.
pub fn label_is_relevant(label: &str, now: NaiveTime) -> bool {
    match WindowLabel::parse(label) {
        Some(parsed) => parsed.is_relevant_at_time(now),
        None => {
            tracing::debug!("Keeping unrecognized window label: {:?}", label);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::windows::{WindowKind, BRIEF_DRY_PERIODS, MOST_DAYLIGHT_HOURS, REST_OF_DAY};
    use chrono::NaiveDate;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn range(start: u32, end: u32) -> WindowLabel {
        WindowLabel::Range {
            start: t(start, 0),
            end: t(end, 0),
        }
    }

    #[test]
    fn test_generic_labels_always_relevant() {
        for text in [REST_OF_DAY, MOST_DAYLIGHT_HOURS, BRIEF_DRY_PERIODS] {
            assert!(WindowLabel::generic(text).is_relevant_at_time(t(23, 59)));
        }
    }

    #[test]
    fn test_single_hour_expires_after_its_hour() {
        let shower = WindowLabel::At { time: t(9, 0) };
        assert!(shower.is_relevant_at_time(t(8, 0)));
        assert!(shower.is_relevant_at_time(t(9, 59)));
        assert!(!shower.is_relevant_at_time(t(10, 0)));
        assert!(!shower.is_relevant_at_time(t(15, 0)));

        let late = WindowLabel::At { time: t(23, 0) };
        assert!(late.is_relevant_at_time(t(23, 59)));
    }

    #[test]
    fn test_range_relevant_until_end() {
        let label = range(12, 14);
        assert!(label.is_relevant_at_time(t(11, 0)));
        assert!(label.is_relevant_at_time(t(13, 59)));
        assert!(!label.is_relevant_at_time(t(14, 0)));
        assert!(!label.is_relevant_at_time(t(18, 0)));
    }

    #[test]
    fn test_range_ending_at_midnight() {
        let label = range(18, 0);
        assert!(label.is_relevant_at_time(t(23, 30)));
    }

    #[test]
    fn test_parse_rendered_labels() {
        assert_eq!(WindowLabel::parse("12:00 PM - 2:00 PM"), Some(range(12, 14)));
        assert_eq!(
            WindowLabel::parse("3:00 PM"),
            Some(WindowLabel::At { time: t(15, 0) })
        );
        assert_eq!(
            WindowLabel::parse("Brief shower around 3:00 PM"),
            Some(WindowLabel::generic("Brief shower around 3:00 PM"))
        );
        assert_eq!(WindowLabel::parse("whenever"), None);
        assert_eq!(WindowLabel::parse("noon - 2:00 PM"), None);
    }

    #[test]
    fn test_parse_inverts_display() {
        let label = WindowLabel::Range {
            start: t(7, 0),
            end: t(19, 0),
        };
        assert_eq!(WindowLabel::parse(&label.to_string()), Some(label));
    }

    #[test]
    fn test_label_is_relevant_fails_open() {
        assert!(label_is_relevant("sometime later", t(22, 0)));
        assert!(label_is_relevant("25:00 XM - 26:00 XM", t(22, 0)));
        assert!(label_is_relevant("Rest of the day", t(22, 0)));
        assert!(!label_is_relevant("9:00 AM - 11:00 AM", t(12, 0)));
        assert!(label_is_relevant("9:00 AM - 1:00 PM", t(12, 0)));
        assert!(!label_is_relevant("9:00 AM", t(15, 0)));
    }

    #[test]
    fn test_report_filtering_keeps_message_and_future_windows() {
        let report = WindowReport {
            dry_windows: vec![
                Window::new(WindowKind::Dry, range(7, 10)),
                Window::new(WindowKind::Dry, range(12, 19)),
            ],
            rain_windows: vec![Window::new(WindowKind::Rain, range(10, 12))],
            message: None,
        };
        let now = NaiveDate::from_ymd_opt(2026, 6, 1)
            .unwrap()
            .and_hms_opt(11, 0, 0)
            .unwrap()
            .and_utc();

        let current = report.relevant_at(now, &Utc);
        assert_eq!(current.dry_windows, vec![Window::new(WindowKind::Dry, range(12, 19))]);
        assert_eq!(current.rain_windows.len(), 1);
        assert_eq!(current.message, None);
    }
}
