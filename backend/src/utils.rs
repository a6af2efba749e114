use chrono::{DateTime, Utc};
use serde_json::Value;

/// Parse an ISO8601 timestamp as sent by Google APIs
pub fn parse_iso8601(date_str: &str) -> Option<DateTime<Utc>> {
    if date_str.is_empty() {
        return None;
    }

    date_str.parse::<DateTime<Utc>>().ok()
}

/// Split a comma separated env value, dropping blanks
pub fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Google APIs wrap failures as `{"error": {"message": ...}}`; fall back to the raw body.
pub fn provider_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}
