//! Route configuration and setup.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use essence_infra::request_id_middleware;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{event::receive_events, health::liveness_check};
use crate::state::AppState;

/// Build the router: event intake plus liveness.
pub fn setup_routes(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/event", post(receive_events))
        .route("/health/live", get(liveness_check))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}
