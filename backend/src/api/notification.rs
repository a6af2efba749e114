use crate::error::ApiResult;
use crate::models::{NotificationRequest, NotificationResponse};
use crate::AppState;
use rocket::serde::json::Json;
use rocket::{post, State};

#[post("/sendNotification", data = "<request>")]
pub async fn send_notification(
    request: Option<Json<NotificationRequest>>,
    state: &State<AppState>,
) -> ApiResult<Json<NotificationResponse>> {
    let request = request.map(Json::into_inner).unwrap_or_default();

    let result = state
        .notifications
        .send(request.fcm_token, request.title, request.body, request.data)
        .await?;

    Ok(Json(NotificationResponse {
        message: "Notification sent successfully".to_string(),
        result,
    }))
}
