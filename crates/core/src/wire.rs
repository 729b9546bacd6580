// Parsing helpers for the backend's loosely typed fields

use chrono::{DateTime, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer};

use crate::error::{Result, SyncError};

/// Format used by datetime-local inputs and sent back to the backend
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

const DATETIME_INPUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

pub(crate) fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_INPUTS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

pub(crate) fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

/// Accepts `HH:MM`, `HH:MM:SS` and `HH:MM:SS.fff`
pub(crate) fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

/// Minute-granularity display form
pub(crate) fn format_time(value: &NaiveTime) -> String {
    value.format("%H:%M").to_string()
}

/// Wire form: seconds always present
pub(crate) fn format_time_with_seconds(value: &NaiveTime) -> String {
    value.format("%H:%M:00").to_string()
}

/// Optional field setter: empty clears, anything else must parse
pub(crate) fn set_datetime(field: &str, value: &str) -> Result<Option<NaiveDateTime>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse_datetime(value)
        .map(Some)
        .ok_or_else(|| SyncError::invalid_value(field, "expected YYYY-MM-DDTHH:MM"))
}

pub(crate) fn set_time(field: &str, value: &str) -> Result<NaiveTime> {
    parse_time(value).ok_or_else(|| SyncError::invalid_value(field, "expected HH:MM"))
}

pub(crate) fn parse_bool(field: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "si" | "sí" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(SyncError::invalid_value(field, "expected true or false")),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

/// Capacities arrive as numbers from some endpoints and strings from others
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}
