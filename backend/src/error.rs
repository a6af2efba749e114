//! Domain errors and their HTTP rendering.

use crate::models::ErrorResponse;
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use thiserror::Error;

/// Every failure a request can end in. None of them are retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// The video is already in the user's cache.
    #[error("{error}: {message}")]
    Conflict { error: String, message: String },

    /// Unknown user collection or video id.
    #[error("{0}")]
    NotFound(String),

    /// The video listing provider failed or timed out.
    #[error("Failed to fetch trending videos: {0}")]
    Upstream(String),

    /// The push provider rejected the message or was unreachable.
    #[error("Failed to send notification: {0}")]
    Delivery(String),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::Validation(_) => Status::BadRequest,
            ApiError::Conflict { .. } => Status::Conflict,
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::Upstream(_) | ApiError::Delivery(_) => Status::InternalServerError,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        match self {
            ApiError::Validation(error) | ApiError::NotFound(error) => {
                ErrorResponse::new(self.status(), error)
            }
            ApiError::Conflict { error, message } => {
                ErrorResponse::new(self.status(), error).with_message(message)
            }
            ApiError::Upstream(details) => {
                ErrorResponse::new(self.status(), "Failed to fetch trending videos")
                    .with_details(details)
            }
            ApiError::Delivery(details) => {
                ErrorResponse::new(self.status(), "Failed to send notification")
                    .with_details(details)
            }
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        self.to_response().respond_to(request)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
