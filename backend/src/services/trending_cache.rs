use crate::clock::Clock;
use crate::error::{ApiError, ApiResult};
use crate::models::TrendingVideo;
use crate::services::video_service::VideoProvider;
use chrono::{DateTime, Duration, Utc};
use log::{error, info};
use rand::seq::SliceRandom;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const TRENDING_SAMPLE_SIZE: usize = 10;

#[derive(Debug, Default)]
struct TrendingCacheState {
    batch: Vec<TrendingVideo>,
    fetched_at: Option<DateTime<Utc>>,
}

impl TrendingCacheState {
    fn needs_refresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        if self.batch.is_empty() {
            return true;
        }
        self.fetched_at
            .map_or(true, |fetched_at| now - fetched_at > ttl)
    }
}

/// Last trending batch, refreshed from the provider once it is older than `ttl`.
///
/// The refresh runs while holding the state lock, so callers that find the
/// batch stale at the same time share one upstream request.
pub struct TrendingCache {
    provider: Arc<dyn VideoProvider>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    state: Mutex<TrendingCacheState>,
}

impl TrendingCache {
    pub fn new(provider: Arc<dyn VideoProvider>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        TrendingCache {
            provider,
            clock,
            ttl,
            state: Mutex::new(TrendingCacheState::default()),
        }
    }

    /// Up to [`TRENDING_SAMPLE_SIZE`] videos picked uniformly from the current batch.
    pub async fn sample(&self) -> ApiResult<Vec<TrendingVideo>> {
        let mut videos = self.current_batch().await?;
        videos.shuffle(&mut rand::thread_rng());
        videos.truncate(TRENDING_SAMPLE_SIZE);
        Ok(videos)
    }

    #[cfg(test)]
    pub async fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.fetched_at
    }

    async fn current_batch(&self) -> ApiResult<Vec<TrendingVideo>> {
        let mut state = self.state.lock().await;
        let now = self.clock.now();

        if state.needs_refresh(now, self.ttl) {
            let batch = self.provider.fetch_trending().await.map_err(|e| {
                error!("Failed to refresh trending videos: {e:?}");
                ApiError::Upstream(e.to_string())
            })?;

            info!("Trending cache refreshed with {} videos.", batch.len());
            *state = TrendingCacheState {
                batch,
                fetched_at: Some(now),
            };
        }

        Ok(state.batch.clone())
    }
}
