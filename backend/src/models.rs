use chrono::{DateTime, Utc};
use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::Responder;
use rocket::serde::{Deserialize, Serialize};
use rocket::{response, Response};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::io::Cursor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingVideo {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    Cached,
}

/// A video saved by a user: the submitted fields plus server bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedVideo {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub cached_at: DateTime<Utc>,
    pub status: CacheStatus,
}

impl CachedVideo {
    /// Server-owned keys replace whatever the caller sent under the same name.
    pub fn new(mut fields: Map<String, Value>, cached_at: DateTime<Utc>) -> Self {
        fields.remove("cachedAt");
        fields.remove("status");
        CachedVideo {
            fields,
            cached_at,
            status: CacheStatus::Cached,
        }
    }

    pub fn id(&self) -> Option<String> {
        self.fields.get("id").and_then(video_id_key)
    }
}

/// String form of a video id, as it appears in a path segment.
///
/// Strings must be non-empty. Numbers are keyed by their decimal text with
/// integral floats collapsed (`1e2` and `100.0` both key as `"100"`), so a
/// numeric id and the same digits sent as a string are one id.
pub fn video_id_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(number_key(n)),
        _ => None,
    }
}

fn number_key(n: &Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f.abs() < MAX_EXACT_INTEGER {
                return format!("{}", f as i64);
            }
        }
    }
    n.to_string()
}

/// Largest magnitude below which every integral `f64` converts to `i64` exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheAddResponse {
    pub message: String,
    pub video: CachedVideo,
    pub total_cached: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRemoveResponse {
    pub message: String,
    pub remaining_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheClearResponse {
    pub message: String,
    pub cleared_count: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NotificationRequest {
    #[serde(rename = "fcmToken", default)]
    pub fcm_token: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
}

/// Payload handed to the push provider after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub token: String,
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub message: String,
    pub result: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(skip)]
    pub status: Status,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl Default for ErrorResponse {
    fn default() -> Self {
        ErrorResponse {
            status: Status::InternalServerError,
            error: String::new(),
            message: None,
            details: None,
        }
    }
}

impl ErrorResponse {
    pub fn new(status: Status, error: impl Into<String>) -> Self {
        ErrorResponse {
            status,
            error: error.into(),
            ..Default::default()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl<'r> Responder<'r, 'static> for ErrorResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let json = serde_json::to_string(&self).map_err(|_| Status::InternalServerError)?;
        Response::build()
            .status(self.status)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}
