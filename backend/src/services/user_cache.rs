use crate::clock::Clock;
use crate::error::{ApiError, ApiResult};
use crate::models::{video_id_key, CachedVideo};
use dashmap::DashMap;
use log::info;
use serde_json::Value;
use std::sync::Arc;

const MISSING_ID: &str = "Video data with id is required";
const NO_USER_CACHE: &str = "No cache found for this user";
const VIDEO_NOT_CACHED: &str = "Video not found in cache";

/// Videos each user has explicitly saved, in insertion order.
///
/// Every operation holds the user's map guard from lookup to mutation, so the
/// id uniqueness check and the insert cannot interleave with another request
/// for the same user.
pub struct UserCacheStore {
    users: DashMap<String, Vec<CachedVideo>>,
    clock: Arc<dyn Clock>,
}

impl UserCacheStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        UserCacheStore {
            users: DashMap::new(),
            clock,
        }
    }

    pub fn list(&self, user_id: &str) -> Vec<CachedVideo> {
        self.users
            .get(user_id)
            .map(|videos| videos.clone())
            .unwrap_or_default()
    }

    /// Returns the stored record and the user's new total.
    pub fn add(&self, user_id: &str, video_data: Value) -> ApiResult<(CachedVideo, usize)> {
        let Value::Object(fields) = video_data else {
            return Err(ApiError::Validation(MISSING_ID.to_string()));
        };
        let video_id = fields
            .get("id")
            .and_then(video_id_key)
            .ok_or_else(|| ApiError::Validation(MISSING_ID.to_string()))?;

        let mut videos = self.users.entry(user_id.to_string()).or_default();
        if videos.iter().any(|v| v.id().as_deref() == Some(video_id.as_str())) {
            return Err(ApiError::Conflict {
                error: "Video already cached".to_string(),
                message: "This video is already in your cache".to_string(),
            });
        }

        let video = CachedVideo::new(fields, self.clock.now());
        videos.push(video.clone());
        info!("User {user_id} cached video {video_id} ({} total)", videos.len());
        Ok((video, videos.len()))
    }

    /// Returns how many videos the user still has cached.
    pub fn remove(&self, user_id: &str, video_id: &str) -> ApiResult<usize> {
        let mut videos = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| ApiError::NotFound(NO_USER_CACHE.to_string()))?;

        let position = videos
            .iter()
            .position(|v| v.id().as_deref() == Some(video_id))
            .ok_or_else(|| ApiError::NotFound(VIDEO_NOT_CACHED.to_string()))?;

        videos.remove(position);
        info!("User {user_id} removed video {video_id} ({} left)", videos.len());
        Ok(videos.len())
    }

    /// Returns how many videos were dropped.
    pub fn clear(&self, user_id: &str) -> ApiResult<usize> {
        let mut videos = self
            .users
            .get_mut(user_id)
            .filter(|videos| !videos.is_empty())
            .ok_or_else(|| ApiError::NotFound(NO_USER_CACHE.to_string()))?;

        let cleared = videos.len();
        videos.clear();
        info!("User {user_id} cleared {cleared} cached videos");
        Ok(cleared)
    }
}
