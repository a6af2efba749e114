//! Firebase Cloud Messaging over the HTTP v1 API.
//!
//! Authenticates with a Google service account: a signed JWT assertion is
//! exchanged for an OAuth2 access token, which is reused until shortly before
//! it expires.

use crate::models::Notification;
use crate::services::notification_service::NotificationSender;
use crate::utils::provider_error_message;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::info;
use reqwest::Client;
use rocket::serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use tokio::sync::Mutex;

const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// The subset of a service-account key file FCM needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid service account JSON in {}", path.display()))
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

pub struct FcmClient {
    client: Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    token: Mutex<Option<AccessToken>>,
}

impl FcmClient {
    pub fn new(client: Client, key: ServiceAccountKey) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .context("Service account private_key is not a valid RSA PEM key")?;

        Ok(FcmClient {
            client,
            key,
            encoding_key,
            token: Mutex::new(None),
        })
    }

    fn send_url(&self) -> String {
        format!(
            "https://fcm.googleapis.com/v1/projects/{}/messages:send",
            self.key.project_id
        )
    }

    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref() {
            if token.expires_at - Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) > now {
                return Ok(token.value.clone());
            }
        }

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();
        let assertion = encode(
            &header,
            &assertion_claims(&self.key, now),
            &self.encoding_key,
        )?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "OAuth token exchange failed with status {}: {}",
                status,
                provider_error_message(&body)
            ));
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        info!("Obtained FCM access token valid for {}s", token.expires_in);
        let value = token.access_token.clone();
        *cached = Some(AccessToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        });
        Ok(value)
    }
}

#[rocket::async_trait]
impl NotificationSender for FcmClient {
    async fn send(&self, notification: &Notification) -> Result<String> {
        let access_token = self.access_token().await?;

        let response = self
            .client
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(&message_body(notification))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "FCM send failed with status {}: {}",
                status,
                provider_error_message(&body)
            ));
        }

        let sent: Value = serde_json::from_str(&body)?;
        sent["name"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| anyhow::anyhow!("FCM response did not contain a message name"))
    }
}

fn assertion_claims(key: &ServiceAccountKey, now: DateTime<Utc>) -> AssertionClaims {
    let iat = now.timestamp();
    AssertionClaims {
        iss: key.client_email.clone(),
        scope: FCM_SCOPE.to_string(),
        aud: key.token_uri.clone(),
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    }
}

fn message_body(notification: &Notification) -> Value {
    json!({
        "message": {
            "token": notification.token,
            "notification": {
                "title": notification.title,
                "body": notification.body,
            },
            "data": notification.data,
        }
    })
}
