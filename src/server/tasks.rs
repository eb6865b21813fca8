use super::error::ApiError;
use super::identity::Identity;
use super::{AppState, StatusResponse};
use crate::db::tasks::Tasks;
use crate::libs::messages::Message;
use crate::libs::task::{NewTask, Task, TaskFilter, TaskStatus};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub use_ai: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct CreateTaskResponse {
    pub id: i64,
    pub status: &'static str,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub status: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// GET /api/tasks?status=open|completed&search=text
pub async fn list_tasks(State(state): State<AppState>, Query(query): Query<ListTasksQuery>) -> Result<Json<Vec<Task>>, ApiError> {
    let status = match query.status.as_deref() {
        Some(status) => status.parse::<TaskStatus>()?,
        None => TaskStatus::Open,
    };
    let filter = TaskFilter::status(status).with_search(query.search.as_deref().unwrap_or_default());

    let tasks = state.blocking(move |db| Tasks::new(db).fetch(&filter)).await?;
    Ok(Json(tasks))
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    identity: Identity,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateTaskResponse>), ApiError> {
    let Json(body) = payload?;
    let title = body
        .title
        .filter(|title| !title.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request(Message::TaskTitleRequired))?;
    let description = body.description.unwrap_or_default();

    let (title, description) = if body.use_ai.unwrap_or(true) {
        state.rewriter.rewrite_task(&title, &description).await
    } else {
        (title, description)
    };

    let task = NewTask::new(&title, &description, identity.name());
    let id = state.blocking(move |db| Tasks::new(db).insert(&task)).await?;
    tracing::info!(task_id = id, created_by = identity.name(), "{}", Message::TaskCreated(id));

    Ok((
        StatusCode::CREATED,
        Json(CreateTaskResponse {
            id,
            status: "created",
            title,
            description,
        }),
    ))
}

/// GET /api/tasks/:id
pub async fn get_task(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Task>, ApiError> {
    state
        .blocking(move |db| Tasks::new(db).get_by_id(id))
        .await?
        .map(Json)
        .ok_or_else(ApiError::task_not_found)
}

/// PUT /api/tasks/:id
///
/// Applies a status transition when `status` is present and a content edit
/// when `title` or `description` is present. A description sent without a
/// title keeps the stored title. Unknown ids are a silent no-op.
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(body) = payload?;
    let status = body.status.as_deref().map(str::parse::<TaskStatus>).transpose()?;
    if body.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
        return Err(ApiError::bad_request(Message::TaskTitleRequired));
    }

    state
        .blocking(move |db| {
            let tasks = Tasks::new(db);
            if let Some(status) = status {
                tasks.update_status(id, status)?;
            }
            match (body.title, body.description) {
                (Some(title), description) => {
                    tasks.update_content(id, &title, &description.unwrap_or_default())?;
                }
                (None, Some(description)) => {
                    if let Some(task) = tasks.get_by_id(id)? {
                        tasks.update_content(id, &task.title, &description)?;
                    }
                }
                (None, None) => {}
            }
            Ok(())
        })
        .await?;
    tracing::info!(task_id = id, "{}", Message::TaskUpdated(id));

    Ok(Json(StatusResponse::updated()))
}

/// DELETE /api/tasks/:id - removes the task and its whole thread
pub async fn delete_task(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<StatusResponse>, ApiError> {
    let deleted = state.blocking(move |db| Tasks::new(db).delete(id)).await?;
    if deleted > 0 {
        tracing::info!(task_id = id, "{}", Message::TaskDeleted(id));
    }

    Ok(Json(StatusResponse::deleted()))
}
