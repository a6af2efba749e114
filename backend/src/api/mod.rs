mod cache;
mod notification;
mod video;

use crate::models::ErrorResponse;
use rocket::http::Status;
use rocket::{Request, Route};

pub use cache::*;
pub use notification::*;
pub use video::*;

pub fn routes() -> Vec<Route> {
    routes![
        trending_videos,
        list_cached_videos,
        add_cached_video,
        remove_cached_video,
        clear_cached_videos,
        send_notification,
    ]
}

/// Keeps framework-generated errors (unknown path, unreadable body) in the JSON error shape.
#[catch(default)]
pub fn json_catcher(status: Status, _request: &Request<'_>) -> ErrorResponse {
    ErrorResponse::new(status, status.reason().unwrap_or("Unknown error"))
}
