use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("Invalid date format: '{0}' (expected YYYY-MM-DD)")]
    InvalidFormat(String),
    #[error("Invalid date: '{0}' is not a calendar date")]
    InvalidDate(String),
    #[error("Invalid date range: end date {end} must be after start date {start}")]
    Range { start: String, end: String },
}

fn matches_date_pattern(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Parse a strict `YYYY-MM-DD` string into UTC midnight of that day.
///
/// Dates that would roll over into the next month (e.g. `2024-02-30`) are
/// rejected rather than normalized.
pub fn parse_date(text: &str) -> Result<DateTime<Utc>, DateError> {
    if !matches_date_pattern(text) {
        return Err(DateError::InvalidFormat(text.to_string()));
    }

    let year: i32 = text[0..4]
        .parse()
        .map_err(|_| DateError::InvalidFormat(text.to_string()))?;
    let month: u32 = text[5..7]
        .parse()
        .map_err(|_| DateError::InvalidFormat(text.to_string()))?;
    let day: u32 = text[8..10]
        .parse()
        .map_err(|_| DateError::InvalidFormat(text.to_string()))?;

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DateError::InvalidDate(text.to_string()))?;

    if date.format("%Y-%m-%d").to_string() != text {
        return Err(DateError::InvalidDate(text.to_string()));
    }

    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| DateError::InvalidDate(text.to_string()))
}

/// Require `end` to be strictly after `start`.
///
/// A single-day report uses an end date one day after the start date.
pub fn validate_date_range(start: &DateTime<Utc>, end: &DateTime<Utc>) -> Result<(), DateError> {
    if end <= start {
        return Err(DateError::Range {
            start: format_date(start),
            end: format_date(end),
        });
    }
    Ok(())
}

pub fn to_unix_seconds(instant: &DateTime<Utc>) -> i64 {
    instant.timestamp_millis().div_euclid(1000)
}

/// RFC 3339 with second precision and a `Z` suffix, e.g. `2024-01-01T00:00:00Z`.
pub fn to_rfc3339(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn format_date(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d").to_string()
}

/// UTC calendar day of a unix timestamp, as `YYYY-MM-DD`.
pub fn utc_date_of(unix_seconds: i64) -> String {
    match Utc.timestamp_opt(unix_seconds, 0).single() {
        Some(instant) => format_date(&instant),
        None => "unknown".to_string(),
    }
}

/// A validated, forward-ordered report period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn parse(start: &str, end: &str) -> Result<Self, DateError> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        validate_date_range(&start, &end)?;
        Ok(Self { start, end })
    }

    pub fn start_date(&self) -> String {
        format_date(&self.start)
    }

    pub fn end_date(&self) -> String {
        format_date(&self.end)
    }
}
