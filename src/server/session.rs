use super::error::ApiError;
use super::AppState;
use crate::libs::messages::Message;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub ai_available: bool,
}

#[derive(Debug, Deserialize)]
pub struct IdentifyRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IdentifyResponse {
    pub status: &'static str,
    pub user_name: String,
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/config
pub async fn config(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        ai_available: state.rewriter.is_available(),
    })
}

/// POST /api/identify - remembers the caller's display name in a signed cookie
pub async fn identify(
    State(state): State<AppState>,
    payload: Result<Json<IdentifyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;
    let name = body
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::bad_request(Message::UserNameRequired))?;

    tracing::debug!("{}", Message::UserIdentified(name.clone()));
    let cookie = state.signer.cookie(&name);

    Ok((
        [(SET_COOKIE, cookie)],
        Json(IdentifyResponse {
            status: "success",
            user_name: name,
        }),
    ))
}
