//! Inbound PREMIS event webhook.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode, Extension, Json};
use essence_infra::RequestId;
use essence_services::parse_events;
use serde::{Deserialize, Serialize};

use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct EventAccepted {
    pub message: String,
}

/// Accept a PREMIS envelope and process its events in the background.
///
/// The response only reports how many events were parsed; per-event
/// results are logged.
pub async fn receive_events(
    State(state): State<Arc<AppState>>,
    request_id: Option<Extension<RequestId>>,
    body: Bytes,
) -> Result<(StatusCode, Json<EventAccepted>), HttpAppError> {
    let events = parse_events(&body, &state.archived_event_types)?;
    let count = events.len();

    tracing::info!(events = count, bytes = body.len(), "Received PREMIS events");

    let request_id = request_id.map(|Extension(RequestId(id))| id);
    state.job_queue.submit(events, request_id);

    Ok((
        StatusCode::ACCEPTED,
        Json(EventAccepted {
            message: format!("Processing {} event(s) in the background.", count),
        }),
    ))
}
