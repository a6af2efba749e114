#[macro_use]
extern crate rocket;

mod api;
mod clock;
mod config;
mod error;
mod models;
mod services;
#[cfg(test)]
mod testing;
mod utils;

use crate::clock::Clock;
use crate::services::notification_service::{NotificationRelay, NotificationSender};
use crate::services::trending_cache::TrendingCache;
use crate::services::user_cache::UserCacheStore;
use crate::services::video_service::VideoProvider;
use log::error;
use rocket::{Build, Rocket};
use std::sync::Arc;

/// Process-lifetime state shared by all routes.
pub struct AppState {
    pub trending: TrendingCache,
    pub user_cache: UserCacheStore,
    pub notifications: NotificationRelay,
}

impl AppState {
    pub fn new(
        videos: Arc<dyn VideoProvider>,
        notifications: Arc<dyn NotificationSender>,
        clock: Arc<dyn Clock>,
        trending_ttl: chrono::Duration,
    ) -> Self {
        AppState {
            trending: TrendingCache::new(videos, clock.clone(), trending_ttl),
            user_cache: UserCacheStore::new(clock),
            notifications: NotificationRelay::new(notifications),
        }
    }
}

pub fn mount_api(rocket: Rocket<Build>, state: AppState) -> Rocket<Build> {
    rocket
        .manage(state)
        .mount("/api", api::routes())
        .register("/", catchers![api::json_catcher])
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    config::load_environment();
    config::init_logger();

    let state = config::create_app_state()?;
    let cors = config::create_cors()?;

    let rocket = mount_api(rocket::custom(config::rocket_figment()), state).attach(cors);
    if let Err(e) = rocket.launch().await {
        error!("Rocket failed to launch: {e}");
        return Err(anyhow::anyhow!("Rocket failed to launch: {e}"));
    }

    Ok(())
}
