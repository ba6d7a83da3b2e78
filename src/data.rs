//! Cell-level parsing and formatting primitives shared by the profiling,
//! plotting, and editing layers.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Parses a raw field as a number the way a lenient coercion would: trimmed,
/// plain integer or float syntax. Returns `None` for anything else.
pub fn parse_numeric(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_naive_date(value: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

pub fn parse_naive_datetime(value: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

pub fn parse_naive_time(value: &str) -> Option<NaiveTime> {
    const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M %p", "%I:%M:%S %p"];
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())
}

/// Coerces a raw field to a timestamp. Date-only values land at midnight; a
/// bare time of day is anchored to today's date, which is what drives the
/// time-only summary heuristic downstream.
pub fn parse_stamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(dt) = parse_naive_datetime(trimmed) {
        return Some(dt);
    }
    if let Some(date) = parse_naive_date(trimmed) {
        return date.and_hms_opt(0, 0, 0);
    }
    parse_naive_time(trimmed).map(|time| Local::now().date_naive().and_time(time))
}

/// Compact numeric display: integral values drop the fraction, everything
/// else keeps at most four decimals.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        let formatted = format!("{value:.4}");
        let trimmed = formatted.trim_end_matches('0');
        trimmed.trim_end_matches('.').to_string()
    }
}

/// Filesystem- and identifier-safe column name.
pub fn normalize_column_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' => c,
            _ => '_',
        })
        .collect::<String>()
        .to_ascii_lowercase()
}

pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
