//! Canonical date/time formats and their normalization.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub(crate) const TIME_FORMAT: &str = "%H:%M:%S";

/// True when `s` is exactly `YYYY-MM-DD` for a real calendar date.
/// Round-trips through a parse + reformat so `1998-5-15` does not pass.
pub(crate) fn is_canonical_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map(|d| d.format(DATE_FORMAT).to_string() == s)
        .unwrap_or(false)
}

/// True when `s` is exactly `YYYY-MM-DD HH:MM:SS`.
pub(crate) fn is_canonical_datetime(s: &str) -> bool {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .map(|d| d.format(DATETIME_FORMAT).to_string() == s)
        .unwrap_or(false)
}

/// True when `s` is exactly `HH:MM:SS`.
pub(crate) fn is_canonical_time(s: &str) -> bool {
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .map(|t| t.format(TIME_FORMAT).to_string() == s)
        .unwrap_or(false)
}

/// Normalize a date string to `YYYY-MM-DD`.
/// Accepts the canonical form unchanged, then attempts `DD/MM/YYYY`.
pub(crate) fn normalize_date(s: &str) -> Option<String> {
    if is_canonical_date(s) {
        return Some(s.to_string());
    }
    NaiveDate::parse_from_str(s, "%d/%m/%Y")
        .ok()
        .map(|d| d.format(DATE_FORMAT).to_string())
}

/// Normalize a datetime string to `YYYY-MM-DD HH:MM:SS`.
/// Accepts the canonical form unchanged, then `DD/MM/YYYY HH:MM:SS`, then
/// `YYYY-MM-DD HH:MM` with seconds defaulted to 00.
pub(crate) fn normalize_datetime(s: &str) -> Option<String> {
    if is_canonical_datetime(s) {
        return Some(s.to_string());
    }
    if let Ok(d) = NaiveDateTime::parse_from_str(s, "%d/%m/%Y %H:%M:%S") {
        return Some(d.format(DATETIME_FORMAT).to_string());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M")
        .ok()
        .map(|d| d.format(DATETIME_FORMAT).to_string())
}

/// Normalize a time string to `HH:MM:SS`.
/// Accepts the canonical form unchanged, then `HH:MM` with seconds 00.
pub(crate) fn normalize_time(s: &str) -> Option<String> {
    if is_canonical_time(s) {
        return Some(s.to_string());
    }
    NaiveTime::parse_from_str(s, "%H:%M")
        .ok()
        .map(|t| t.format(TIME_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_first_dates_are_reformatted() {
        assert_eq!(normalize_date("15/05/1998").as_deref(), Some("1998-05-15"));
        assert_eq!(normalize_date("1998-05-15").as_deref(), Some("1998-05-15"));
        assert_eq!(normalize_date("1998-15-05"), None);
    }

    #[test]
    fn unpadded_dates_are_not_canonical() {
        assert!(!is_canonical_date("1998-5-15"));
        assert!(is_canonical_date("1998-05-15"));
    }

    #[test]
    fn datetime_seconds_are_defaulted() {
        assert_eq!(
            normalize_datetime("1998-05-15 10:30").as_deref(),
            Some("1998-05-15 10:30:00")
        );
        assert_eq!(
            normalize_datetime("15/05/1998 10:30:45").as_deref(),
            Some("1998-05-15 10:30:45")
        );
        assert_eq!(normalize_datetime("not a datetime"), None);
    }

    #[test]
    fn time_minutes_only_gains_seconds() {
        assert_eq!(normalize_time("10:30").as_deref(), Some("10:30:00"));
        assert_eq!(normalize_time("10:30:45").as_deref(), Some("10:30:45"));
        assert_eq!(normalize_time("25:00:00"), None);
    }
}
