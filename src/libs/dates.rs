//! Date and timestamp normalization.
//!
//! Due dates are date-only values stored as `YYYY-MM-DD` text. User input and
//! legacy rows arrive in looser shapes, so everything passes through
//! [`normalize_date_only`] before it reaches a query or a view.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Extra shapes accepted after the strict `YYYY-MM-DD` and RFC 3339 checks.
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];
const DATE_FORMATS: &[&str] = &["%Y/%m/%d"];

/// Current time as an ISO-8601 UTC string with millisecond precision.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Reduces free-form input to a calendar date, or `None` when no valid date
/// can be recovered.
///
/// ```rust
/// use todo004::libs::dates::normalize_date_only;
///
/// assert_eq!(normalize_date_only("2025-06-01").unwrap().to_string(), "2025-06-01");
/// assert_eq!(normalize_date_only("2025-06-01T23:15:00Z").unwrap().to_string(), "2025-06-01");
/// assert!(normalize_date_only("2025-13-45").is_none());
/// assert!(normalize_date_only("   ").is_none());
/// ```
pub fn normalize_date_only(input: &str) -> Option<NaiveDate> {
    let raw = input.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_KEY_FORMAT) {
        return Some(date);
    }
    if let Ok(date_time) = DateTime::parse_from_rfc3339(raw) {
        return Some(date_time.with_timezone(&Utc).date_naive());
    }
    if let Some(date_time) = DATE_TIME_FORMATS.iter().find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok()) {
        return Some(date_time.date());
    }
    DATE_FORMATS.iter().find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Same as [`normalize_date_only`] for optional column values.
pub fn normalize_optional_date(input: Option<&str>) -> Option<NaiveDate> {
    input.and_then(normalize_date_only)
}

/// Normalizes a stored creation timestamp, substituting "now" when the value
/// is missing or unreadable.
pub fn normalize_date_time(input: Option<&str>) -> String {
    let Some(raw) = input.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return now_iso();
    };

    if let Ok(date_time) = DateTime::parse_from_rfc3339(raw) {
        return date_time.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true);
    }
    if let Some(date_time) = DATE_TIME_FORMATS.iter().find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok()) {
        return date_time.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_KEY_FORMAT) {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return midnight.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true);
        }
    }
    now_iso()
}
