use crate::error::{ApiError, ApiResult};
use crate::models::Notification;
use anyhow::Result;
use log::{error, info};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

const MISSING_FIELDS: &str = "fcmToken, title, and body are required";

/// Push delivery backend. Returns the provider-assigned message id.
#[rocket::async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<String>;
}

/// Validates notification requests and forwards them once, without retries.
pub struct NotificationRelay {
    sender: Arc<dyn NotificationSender>,
}

impl NotificationRelay {
    pub fn new(sender: Arc<dyn NotificationSender>) -> Self {
        NotificationRelay { sender }
    }

    pub async fn send(
        &self,
        token: Option<String>,
        title: Option<String>,
        body: Option<String>,
        data: Option<Map<String, Value>>,
    ) -> ApiResult<String> {
        let notification = build_notification(token, title, body, data)?;

        match self.sender.send(&notification).await {
            Ok(message_id) => {
                info!("Successfully sent message: {message_id}");
                Ok(message_id)
            }
            Err(e) => {
                error!("Error sending message: {e:?}");
                Err(ApiError::Delivery(e.to_string()))
            }
        }
    }
}

fn required(value: Option<String>) -> ApiResult<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Validation(MISSING_FIELDS.to_string()))
}

pub fn build_notification(
    token: Option<String>,
    title: Option<String>,
    body: Option<String>,
    data: Option<Map<String, Value>>,
) -> ApiResult<Notification> {
    let token = required(token)?;
    let title = required(title)?;
    let body = required(body)?;

    let data = data
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key, s)),
            _ => Err(ApiError::Validation(format!(
                "data.{key} must be a string"
            ))),
        })
        .collect::<ApiResult<HashMap<String, String>>>()?;

    Ok(Notification {
        token,
        title,
        body,
        data,
    })
}
