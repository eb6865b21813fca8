//! HTTP+JSON surface.
//!
//! | Method | Path | Handler |
//! | --- | --- | --- |
//! | GET | `/health` | [`session::health`] (no API key needed) |
//! | GET | `/api/config` | [`session::config`] |
//! | POST | `/api/identify` | [`session::identify`] |
//! | GET, POST | `/api/tasks` | [`tasks::list_tasks`], [`tasks::create_task`] |
//! | GET, PUT, DELETE | `/api/tasks/:id` | [`tasks::get_task`], [`tasks::update_task`], [`tasks::delete_task`] |
//! | GET, POST | `/api/tasks/:id/messages` | [`messages::list_messages`], [`messages::create_message`] |
//! | PUT, DELETE | `/api/messages/:id` | [`messages::update_message`], [`messages::delete_message`] |
//!
//! Every `/api/*` route sits behind [`auth::require_api_key`].

pub mod auth;
pub mod error;
pub mod identity;
pub mod messages;
pub mod session;
pub mod tasks;

use crate::api::openai::Rewriter;
use crate::db::db::{Db, DbResult};
use crate::libs::config::Config;
use crate::libs::messages::Message;
use anyhow::Result;
use axum::routing::{get, post, put};
use axum::{middleware, Router};
use error::ApiError;
use identity::SessionSigner;
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Dependencies shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub rewriter: Rewriter,
    pub signer: SessionSigner,
    pub api_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(config: &Config, db: Db) -> Result<Self> {
        let rewriter = Rewriter::new(&config.openai)?;
        let signer = SessionSigner::new(&config.session_key().unwrap_or_default())?;

        Ok(Self {
            db,
            rewriter,
            signer,
            api_key: config.server.api_key.as_deref().map(Arc::from),
        })
    }

    /// Runs a store operation on the blocking pool.
    pub async fn blocking<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Db) -> DbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        let result = tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(result?)
    }
}

/// Body of the plain acknowledgement responses.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub fn updated() -> Self {
        StatusResponse { status: "updated" }
    }

    pub fn deleted() -> Self {
        StatusResponse { status: "deleted" }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/config", get(session::config))
        .route("/api/identify", post(session::identify))
        .route("/api/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/api/tasks/:id",
            get(tasks::get_task).put(tasks::update_task).delete(tasks::delete_task),
        )
        .route(
            "/api/tasks/:id/messages",
            get(messages::list_messages).post(messages::create_message),
        )
        .route("/api/messages/:id", put(messages::update_message).delete(messages::delete_message))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_api_key));

    Router::new()
        .route("/health", get(session::health))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn serve(config: &Config, db: Db) -> Result<()> {
    let state = AppState::new(config, db)?;
    if state.api_key.is_none() {
        tracing::error!("{}", Message::ServerApiKeyMissing);
    }
    if state.rewriter.is_available() {
        tracing::info!("{}", Message::AiEnabled(config.openai.model.clone()));
    } else {
        tracing::warn!("{}", Message::AiDisabled);
    }

    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!("{}", Message::ServerListening(listener.local_addr()?.to_string()));

    axum::serve(listener, router(state)).with_graceful_shutdown(shutdown_signal()).await?;
    tracing::info!("{}", Message::ServerShuttingDown);

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
