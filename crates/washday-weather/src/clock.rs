//! 12-hour clock rendering and parsing for window labels.

use chrono::{NaiveTime, Timelike};

const DISPLAY_FORMAT: &str = "%-I:%M %p";
const PARSE_FORMAT: &str = "%I:%M %p";

/// Render a time as `7:00 AM` / `12:30 PM`
pub fn format_clock(time: NaiveTime) -> String {
    time.format(DISPLAY_FORMAT).to_string()
}

/// Parse a `7:00 AM` style time. Surrounding whitespace is ignored.
pub fn parse_clock(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), PARSE_FORMAT).ok()
}

/// Minutes elapsed since local midnight
pub fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Top of the given hour; hour 24 wraps to midnight
pub fn on_the_hour(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour % 24, 0, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_format_morning_and_afternoon() {
        assert_eq!(format_clock(t(7, 0)), "7:00 AM");
        assert_eq!(format_clock(t(12, 0)), "12:00 PM");
        assert_eq!(format_clock(t(19, 0)), "7:00 PM");
        assert_eq!(format_clock(t(0, 30)), "12:30 AM");
    }

    #[test]
    fn test_parse_accepts_single_digit_hour() {
        assert_eq!(parse_clock("7:00 PM"), Some(t(19, 0)));
        assert_eq!(parse_clock(" 11:15 AM "), Some(t(11, 15)));
        assert_eq!(parse_clock("12:00 AM"), Some(t(0, 0)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_clock("soon"), None);
        assert_eq!(parse_clock("19:00"), None);
        assert_eq!(parse_clock(""), None);
    }

    #[test]
    fn test_minutes_since_midnight() {
        assert_eq!(minutes_since_midnight(t(0, 0)), 0);
        assert_eq!(minutes_since_midnight(t(13, 45)), 825);
    }

    #[test]
    fn test_on_the_hour_wraps() {
        assert_eq!(on_the_hour(19), t(19, 0));
        assert_eq!(on_the_hour(24), t(0, 0));
    }
}
