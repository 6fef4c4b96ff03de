//! HTTP handlers for the critique API

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use brandlens_core::{run_workflow, Collaborators, CritiqueRequest, WorkflowOptions};

use crate::error::ApiError;
use crate::stream;

/// State shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Analysis backends the workflow fans out to.
    pub collaborators: Arc<dyn Collaborators>,

    /// Per-run tuning applied to every request.
    pub options: WorkflowOptions,
}

impl AppState {
    pub fn new(collaborators: Arc<dyn Collaborators>, options: WorkflowOptions) -> Self {
        Self {
            collaborators,
            options,
        }
    }
}

/// GET /api/health - Health check endpoint
pub async fn health(State(_state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "brandlensd",
        "version": brandlens_core::VERSION,
    }))
}

/// POST /api/critique - Run one critique over a submitted video
///
/// Buffered by default. A body carrying `stream: true` is answered with
/// the same SSE stream as `/api/critique/stream`; the handler branches
/// internally rather than redirecting.
pub async fn critique(
    State(state): State<AppState>,
    Json(request): Json<CritiqueRequest>,
) -> Response {
    if request.stream {
        return match stream::open_event_stream(state, request) {
            Ok(sse) => sse.into_response(),
            Err(err) => err.into_response(),
        };
    }
    critique_buffered(state, request).await
}

/// Runs the workflow to completion and maps the run outcome onto a status
/// code: 200 for a successful run, 502 when any step failed. Both carry
/// the full run body so clients always see per-step records.
async fn critique_buffered(state: AppState, request: CritiqueRequest) -> Response {
    let run = match run_workflow(request, state.collaborators, state.options, None).await {
        Ok(run) => run,
        Err(err) => return ApiError::validation(&err).into_response(),
    };

    let status = if run.is_success() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    (status, Json(run)).into_response()
}

/// Create router with all API endpoints
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/critique", post(critique))
        .route("/api/critique/stream", post(stream::critique_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
}
