use crate::error::ApiResult;
use crate::models::TrendingVideo;
use crate::AppState;
use rocket::serde::json::Json;
use rocket::{get, State};

#[get("/videos")]
pub async fn trending_videos(state: &State<AppState>) -> ApiResult<Json<Vec<TrendingVideo>>> {
    let videos = state.trending.sample().await?;
    Ok(Json(videos))
}
