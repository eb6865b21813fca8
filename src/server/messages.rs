use super::error::ApiError;
use super::identity::Identity;
use super::{AppState, StatusResponse};
use crate::db::messages::Messages;
use crate::db::tasks::Tasks;
use crate::libs::messages::Message;
use crate::libs::task_message::{NewTaskMessage, TaskMessage};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub content: Option<String>,
    pub use_ai: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct CreateMessageResponse {
    pub id: i64,
    pub content: String,
    pub original_content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMessageRequest {
    pub content: Option<String>,
}

fn required_content(content: Option<String>) -> Result<String, ApiError> {
    content
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request(Message::MessageContentRequired))
}

/// GET /api/tasks/:id/messages
pub async fn list_messages(State(state): State<AppState>, Path(task_id): Path<i64>) -> Result<Json<Vec<TaskMessage>>, ApiError> {
    let messages = state.blocking(move |db| Messages::new(db).fetch(task_id)).await?;
    Ok(Json(messages))
}

/// POST /api/tasks/:id/messages
///
/// The submitted text is kept as `original_content`; `content` holds the
/// rewritten text when rewriting is enabled and succeeds.
pub async fn create_message(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
    identity: Identity,
    payload: Result<Json<CreateMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateMessageResponse>), ApiError> {
    let Json(body) = payload?;
    let original = required_content(body.content)?;

    // Skip the rewrite call for threads that do not exist.
    if state.blocking(move |db| Tasks::new(db).get_by_id(task_id)).await?.is_none() {
        return Err(ApiError::task_not_found());
    }

    let content = if body.use_ai.unwrap_or(true) {
        state.rewriter.rewrite_message(&original).await
    } else {
        original.clone()
    };

    let message = NewTaskMessage::new(task_id, identity.name(), &content, &original);
    let id = state.blocking(move |db| Messages::new(db).insert(&message)).await?;
    tracing::info!(message_id = id, task_id, user = identity.name(), "{}", Message::MessageCreated(id, task_id));

    Ok((
        StatusCode::CREATED,
        Json(CreateMessageResponse {
            id,
            content,
            original_content: original,
        }),
    ))
}

/// PUT /api/messages/:id - edits are stored verbatim, never rewritten
pub async fn update_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateMessageRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(body) = payload?;
    let content = required_content(body.content)?;

    state.blocking(move |db| Messages::new(db).update(id, &content)).await?;
    tracing::info!(message_id = id, "{}", Message::MessageUpdated(id));

    Ok(Json(StatusResponse::updated()))
}

/// DELETE /api/messages/:id
pub async fn delete_message(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<StatusResponse>, ApiError> {
    let deleted = state.blocking(move |db| Messages::new(db).delete(id)).await?;
    if deleted > 0 {
        tracing::info!(message_id = id, "{}", Message::MessageDeleted(id));
    }

    Ok(Json(StatusResponse::deleted()))
}
