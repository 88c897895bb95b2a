//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::{future::Future, io, sync::Arc};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/start", post(start_handler))
        .route("/pause", post(pause_handler))
        .route("/resume", post(resume_handler))
        .route("/toggle", post(toggle_handler))
        .route("/reset", post(reset_request_handler))
        .route("/reset/:id/confirm", post(reset_confirm_handler))
        .route("/reset/:id/cancel", post(reset_cancel_handler))
        .route("/lifecycle/background", post(background_handler))
        .route("/lifecycle/foreground", post(foreground_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Serve the screen until `shutdown` resolves.
///
/// Open connections are drained first, then the screen is unmounted and
/// pending writes are flushed to the store.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let controller = Arc::clone(state.controller());
    let result = axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await;

    info!("Connections drained, flushing timer state");
    controller.flush().await;
    result
}
