//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    error::TimerError,
    state::{AppState, TimerPhase},
    tasks::AppLifecycle,
};
use super::responses::{buttons_for, ApiResponse, HealthResponse, LifecycleResponse, StatusResponse};

type ApiResult = Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)>;

/// Map a rejected timer action to an error response carrying the current state
fn reject(state: &AppState, err: TimerError) -> (StatusCode, Json<ApiResponse>) {
    let status = match err {
        TimerError::InvalidTransition { .. } => StatusCode::CONFLICT,
        TimerError::NoPendingReset(_) => StatusCode::NOT_FOUND,
    };
    warn!("Rejected timer action: {}", err);
    (status, Json(ApiResponse::error(err.to_string(), state.controller().snapshot())))
}

/// Handle POST /start - Start an idle timer
pub async fn start_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let timer = state.controller().start().map_err(|e| reject(&state, e))?;
    state.record_action("start");
    info!("Start endpoint called - timer running");
    Ok(Json(ApiResponse::ok("Timer started".to_string(), timer)))
}

/// Handle POST /pause - Pause a running timer
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let timer = state.controller().pause().map_err(|e| reject(&state, e))?;
    state.record_action("pause");
    info!("Pause endpoint called - timer paused at {}", timer.display);
    Ok(Json(ApiResponse::ok("Timer paused".to_string(), timer)))
}

/// Handle POST /resume - Resume a paused timer
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let timer = state.controller().resume().map_err(|e| reject(&state, e))?;
    state.record_action("resume");
    info!("Resume endpoint called - timer running");
    Ok(Json(ApiResponse::ok("Timer resumed".to_string(), timer)))
}

/// Handle POST /toggle - The PAUSE/RESUME button
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let timer = state.controller().toggle().map_err(|e| reject(&state, e))?;
    let (action, message) = match timer.phase {
        TimerPhase::Paused => ("pause", "Timer paused"),
        _ => ("resume", "Timer resumed"),
    };
    state.record_action(action);
    info!("Toggle endpoint called - timer {}", timer.phase);
    Ok(Json(ApiResponse::ok(message.to_string(), timer)))
}

/// Handle POST /reset - Open the reset confirmation prompt
pub async fn reset_request_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let controller = state.controller();
    let prompt = controller.request_reset();
    info!("Reset endpoint called - awaiting confirmation {}", prompt.id);
    Json(ApiResponse::prompt(prompt, controller.snapshot()))
}

/// Handle POST /reset/:id/confirm - Reset the timer
pub async fn reset_confirm_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult {
    let timer = state.controller().confirm_reset(id).map_err(|e| reject(&state, e))?;
    state.record_action("reset");
    info!("Reset {} confirmed - timer cleared", id);
    Ok(Json(ApiResponse::ok("Timer reset".to_string(), timer)))
}

/// Handle POST /reset/:id/cancel - Dismiss the reset prompt
pub async fn reset_cancel_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult {
    let controller = state.controller();
    controller.cancel_reset(id).map_err(|e| reject(&state, e))?;
    info!("Reset {} cancelled", id);
    Ok(Json(ApiResponse::ok("Reset cancelled".to_string(), controller.snapshot())))
}

/// Handle POST /lifecycle/background - App moved to the background
pub async fn background_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<LifecycleResponse>), StatusCode> {
    forward_lifecycle(&state, AppLifecycle::Background)
}

/// Handle POST /lifecycle/foreground - App became active again
pub async fn foreground_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<LifecycleResponse>), StatusCode> {
    forward_lifecycle(&state, AppLifecycle::Active)
}

fn forward_lifecycle(
    state: &AppState,
    event: AppLifecycle,
) -> Result<(StatusCode, Json<LifecycleResponse>), StatusCode> {
    match state.notify_lifecycle(event) {
        Ok(()) => Ok((StatusCode::ACCEPTED, Json(LifecycleResponse::accepted(event)))),
        Err(e) => {
            error!("{}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return what the screen shows
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let controller = state.controller();
    let timer = controller.snapshot();
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        buttons: buttons_for(timer.phase),
        timer,
        reset_prompt: controller.pending_reset(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
