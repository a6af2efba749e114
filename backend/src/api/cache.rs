use crate::error::ApiResult;
use crate::models::{CacheAddResponse, CacheClearResponse, CacheRemoveResponse, CachedVideo};
use crate::AppState;
use log::warn;
use rocket::serde::json::Json;
use rocket::{delete, get, post, State};
use serde_json::Value;

#[get("/cache/<user_id>")]
pub fn list_cached_videos(user_id: &str, state: &State<AppState>) -> Json<Vec<CachedVideo>> {
    Json(state.user_cache.list(user_id))
}

#[post("/cache/<user_id>", data = "<video>")]
pub fn add_cached_video(
    user_id: &str,
    video: Option<Json<Value>>,
    state: &State<AppState>,
) -> ApiResult<Json<CacheAddResponse>> {
    // An unreadable body is treated like one without an id.
    let video_data = video.map(Json::into_inner).unwrap_or(Value::Null);

    match state.user_cache.add(user_id, video_data) {
        Ok((video, total_cached)) => Ok(Json(CacheAddResponse {
            message: "Video cached successfully".to_string(),
            video,
            total_cached,
        })),
        Err(e) => {
            warn!("Rejected cache add for user {user_id}: {e}");
            Err(e)
        }
    }
}

#[delete("/cache/<user_id>/<video_id>")]
pub fn remove_cached_video(
    user_id: &str,
    video_id: &str,
    state: &State<AppState>,
) -> ApiResult<Json<CacheRemoveResponse>> {
    let remaining_count = state.user_cache.remove(user_id, video_id)?;
    Ok(Json(CacheRemoveResponse {
        message: "Video removed from cache".to_string(),
        remaining_count,
    }))
}

#[delete("/cache/<user_id>")]
pub fn clear_cached_videos(
    user_id: &str,
    state: &State<AppState>,
) -> ApiResult<Json<CacheClearResponse>> {
    let cleared_count = state.user_cache.clear(user_id)?;
    Ok(Json(CacheClearResponse {
        message: "Cache cleared successfully".to_string(),
        cleared_count,
    }))
}
