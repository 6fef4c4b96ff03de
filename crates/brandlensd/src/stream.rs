//! SSE streaming for critique runs
//!
//! One `step` frame per completed step, in completion order, then exactly
//! one terminal `complete` or `error` frame; the channel closes after the
//! terminal frame and the stream ends with it. Malformed requests are
//! rejected with a plain 400 before any stream opens.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::warn;

use brandlens_core::{run_workflow, CritiqueRequest, StepFailure, StepId, WorkflowEvent};

use crate::error::{ApiError, ApiResult};
use crate::handlers::AppState;

/// Channel slack for one run's frames. A run emits at most eleven, so
/// step transitions never wait on a slow consumer.
const EVENT_BUFFER: usize = 64;

/// POST /api/critique/stream - Run one critique, streaming step events
pub async fn critique_stream(
    State(state): State<AppState>,
    Json(request): Json<CritiqueRequest>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>> + Send>> {
    open_event_stream(state, request)
}

/// Validates the request, spawns the run, and returns its event stream.
///
/// Also serves `POST /api/critique` bodies carrying `stream: true`.
pub fn open_event_stream(
    state: AppState,
    request: CritiqueRequest,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>> + Send>> {
    if let Err(err) = request.validate() {
        return Err(ApiError::validation(&err));
    }

    let (tx, rx) = mpsc::channel::<WorkflowEvent>(EVENT_BUFFER);
    let events = tx.clone();
    tokio::spawn(async move {
        if let Err(err) = run_workflow(request, state.collaborators, state.options, Some(events)).await
        {
            // Validated above, so this arm should stay cold. If it ever
            // runs, close the stream with a terminal error frame.
            warn!(%err, "critique request rejected after its stream opened");
            let failure = StepFailure {
                step: StepId::Input,
                message: err.to_string(),
            };
            let _ = tx.send(WorkflowEvent::Error(failure)).await;
        }
    });

    let stream = ReceiverStream::new(rx).map(|event| -> Result<Event, Infallible> {
        let frame = Event::default()
            .json_data(event)
            .unwrap_or_else(|_| Event::default().data("serialization failure"));
        Ok(frame)
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use brandlens_agents::StubAgents;
    use brandlens_core::WorkflowOptions;
    use serde_json::json;
    use std::sync::Arc;

    fn stub_state() -> AppState {
        AppState::new(Arc::new(StubAgents::new()), WorkflowOptions::default())
    }

    /// Test: an invalid request is refused before any stream opens.
    #[tokio::test]
    async fn test_invalid_request_is_rejected_before_streaming() {
        let request: CritiqueRequest = serde_json::from_value(json!({
            "videoData": "",
            "brandLogoData": "",
            "brandContext": {"companyName": "Acme", "productName": "Rocket Skates"}
        }))
        .unwrap();

        let err = open_event_stream(stub_state(), request).err().unwrap();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "VALIDATION_ERROR");
        assert!(err.fields.iter().any(|v| v.field == "videoData"));
        assert!(err.fields.iter().any(|v| v.field == "brandLogoData"));
    }

    /// Test: a valid request opens a stream.
    #[tokio::test]
    async fn test_valid_request_opens_stream() {
        let request: CritiqueRequest = serde_json::from_value(json!({
            "videoData": format!("data:video/mp4;base64,{}", "QUJD".repeat(50)),
            "brandLogoData": "bG9nbw==",
            "brandContext": {"companyName": "Acme", "productName": "Rocket Skates"}
        }))
        .unwrap();

        assert!(open_event_stream(stub_state(), request).is_ok());
    }
}
