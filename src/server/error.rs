use crate::db::db::DbError;
use crate::libs::messages::Message;
use crate::libs::task::InvalidStatus;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors a handler can answer with.
///
/// Each variant maps to one status code. The body is
/// `{"error": <label>, "message": <detail>}`, except for not-found responses
/// which carry only `{"error": <detail>}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Misconfigured(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: Message) -> Self {
        ApiError::BadRequest(msg.to_string())
    }

    pub fn task_not_found() -> Self {
        ApiError::NotFound(Message::TaskNotFound.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::TaskNotFound(_) => ApiError::task_not_found(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<InvalidStatus> for ApiError {
    fn from(err: InvalidStatus) -> Self {
        ApiError::bad_request(Message::InvalidTaskStatus(err.0))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": "Bad Request", "message": message })),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "error": message })),
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized", "message": message })),
            ApiError::Misconfigured(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Configuration Error", "message": message }),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error", "message": Message::InternalError.to_string() }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
