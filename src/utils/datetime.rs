use chrono::{DateTime, SecondsFormat, Utc};

/// Second-precision RFC 3339 in UTC, so stored timestamps sort lexically.
pub fn to_db_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn to_db_day(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// Date part of a stored timestamp, falling back to the raw value.
pub fn format_stored_date(stored: &str) -> String {
    DateTime::parse_from_rfc3339(stored)
        .map(|dt| dt.with_timezone(&Utc).format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| stored.split('T').next().unwrap_or(stored).to_string())
}

pub fn format_minutes(minutes: i64) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    match (hours, rest) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}
