//! In-process stand-ins for the YouTube and FCM providers.

use crate::clock::SimulatedClock;
use crate::models::{Notification, TrendingVideo};
use crate::services::notification_service::NotificationSender;
use crate::services::video_service::VideoProvider;
use crate::{mount_api, AppState};
use anyhow::Result;
use chrono::Utc;
use rocket::local::asynchronous::Client;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn trending_batch(prefix: &str, count: usize) -> Vec<TrendingVideo> {
    (0..count)
        .map(|i| TrendingVideo {
            video_id: format!("{prefix}-{i}"),
            title: format!("Video {i}"),
            description: String::new(),
            thumbnail: format!("https://i.ytimg.com/vi/{prefix}-{i}/mqdefault.jpg"),
            published_at: None,
        })
        .collect()
}

/// Serves a fixed batch (or a fixed error) and counts upstream calls.
pub struct FakeVideoProvider {
    response: Mutex<Result<Vec<TrendingVideo>, String>>,
    calls: AtomicUsize,
}

impl FakeVideoProvider {
    pub fn with_batch(batch: Vec<TrendingVideo>) -> Self {
        FakeVideoProvider {
            response: Mutex::new(Ok(batch)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        let provider = Self::with_batch(Vec::new());
        provider.fail_with(message);
        provider
    }

    pub fn set_batch(&self, batch: Vec<TrendingVideo>) {
        if let Ok(mut response) = self.response.lock() {
            *response = Ok(batch);
        }
    }

    pub fn fail_with(&self, message: &str) {
        if let Ok(mut response) = self.response.lock() {
            *response = Err(message.to_string());
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[rocket::async_trait]
impl VideoProvider for FakeVideoProvider {
    async fn fetch_trending(&self) -> Result<Vec<TrendingVideo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Let concurrent callers pile up on the cache lock.
        tokio::task::yield_now().await;

        let response = self
            .response
            .lock()
            .map_err(|_| anyhow::anyhow!("fake provider poisoned"))?
            .clone();
        response.map_err(|message| anyhow::anyhow!(message))
    }
}

/// Records every notification it receives.
pub struct FakeNotificationSender {
    outcome: Result<String, String>,
    sent: Mutex<Vec<Notification>>,
}

impl FakeNotificationSender {
    pub fn accepting(message_id: &str) -> Self {
        FakeNotificationSender {
            outcome: Ok(message_id.to_string()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(message: &str) -> Self {
        FakeNotificationSender {
            outcome: Err(message.to_string()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[rocket::async_trait]
impl NotificationSender for FakeNotificationSender {
    async fn send(&self, notification: &Notification) -> Result<String> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification.clone());
        }
        self.outcome.clone().map_err(|message| anyhow::anyhow!(message))
    }
}

pub fn app_state(
    videos: Arc<FakeVideoProvider>,
    notifications: Arc<FakeNotificationSender>,
) -> AppState {
    let clock = SimulatedClock::starting_at(Utc::now());
    AppState::new(videos, notifications, Arc::new(clock), chrono::Duration::minutes(5))
}

pub async fn local_client(state: AppState) -> Client {
    Client::tracked(mount_api(rocket::build(), state))
        .await
        .expect("valid rocket instance")
}
