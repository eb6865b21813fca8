use super::error::ApiError;
use super::AppState;
use crate::libs::messages::Message;
use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Guards `/api/*`: the caller's `X-API-Key` must equal the server key.
///
/// A server started without a key answers 500 to every API call rather than
/// serving them unauthenticated. Preflight `OPTIONS` requests pass through.
pub async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, ApiError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let Some(expected) = state.api_key.as_deref() else {
        tracing::error!("{}", Message::ServerApiKeyMissing);
        return Err(ApiError::Misconfigured(Message::ServerApiKeyNotConfigured.to_string()));
    };

    let provided = request.headers().get(API_KEY_HEADER).and_then(|value| value.to_str().ok());
    match provided {
        Some(provided) if keys_match(provided, expected) => Ok(next.run(request).await),
        _ => Err(ApiError::Unauthorized(Message::InvalidApiKey.to_string())),
    }
}

/// Compares digests so the time taken does not depend on where the keys differ.
fn keys_match(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());

    provided.iter().zip(expected.iter()).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}
