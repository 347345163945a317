use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};

/// Storage format for check timestamps (ISO 8601, UTC, second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
/// Storage format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a stored timestamp; blank or unparseable values yield `None`.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(input, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(input)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        })
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).ok()
}

/// The current calendar date on the server.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
