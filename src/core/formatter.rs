use chrono::{DateTime, SecondsFormat, Utc};

use crate::core::dates::parse_date;

/// Returns "$123.45".
pub fn format_usd(value: f64) -> String {
    format!("${:.2}", value)
}

/// Returns "$123.45 USD".
pub fn format_usd_total(value: f64) -> String {
    format!("{} USD", format_usd(value))
}

/// Returns "60.0%".
pub fn format_percent(percent: f64) -> String {
    format!("{:.1}%", percent)
}

/// Nearest whole percentage, as used by the JSON report.
pub fn round_percent(percent: f64) -> i64 {
    percent.round() as i64
}

/// Returns "January 1 - January 31, 2024": start without year, end with year.
///
/// Falls back to the raw strings when either side is not a valid date.
pub fn format_billing_period(start_date: &str, end_date: &str) -> String {
    match (parse_date(start_date), parse_date(end_date)) {
        (Ok(start), Ok(end)) => format!(
            "{} - {}",
            start.format("%B %-d"),
            end.format("%B %-d, %Y")
        ),
        _ => format!("{} - {}", start_date, end_date),
    }
}

/// Returns "2024-01-31T12:00:00Z".
pub fn format_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Quote a CSV field only when it contains a comma, quote or newline.
pub fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
