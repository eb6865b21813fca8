//! Local stand-in for the chat completions endpoint.

#![allow(dead_code)]

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;

pub const STUB_API_KEY: &str = "sk-test";

/// How the stub answers every completion request.
#[derive(Clone)]
pub enum StubReply {
    /// Answers task prompts with this JSON object and message prompts with `text`.
    Rewrite { task: Value, text: String },
    /// Returns `content` verbatim as the assistant message.
    Raw(String),
    /// Fails with this status code.
    Status(u16),
    /// Answers after a delay.
    Slow(Duration),
}

async fn completions(State(reply): State<StubReply>, headers: HeaderMap, Json(request): Json<Value>) -> Response {
    let expected = format!("Bearer {}", STUB_API_KEY);
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let wants_json = request["response_format"]["type"] == "json_object";
    let content = match reply {
        StubReply::Rewrite { task, text } => {
            if wants_json {
                task.to_string()
            } else {
                text
            }
        }
        StubReply::Raw(content) => content,
        StubReply::Status(code) => {
            return StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR).into_response();
        }
        StubReply::Slow(delay) => {
            tokio::time::sleep(delay).await;
            "too late".to_string()
        }
    };

    Json(json!({
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    }))
    .into_response()
}

/// Starts the stub on an ephemeral port and returns its base URL.
pub async fn spawn_stub(reply: StubReply) -> String {
    let app = Router::new().route("/v1/chat/completions", post(completions)).with_state(reply);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/v1", addr)
}
