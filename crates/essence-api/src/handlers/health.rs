use axum::response::IntoResponse;

/// Liveness check; answers as long as the process serves HTTP.
pub async fn liveness_check() -> impl IntoResponse {
    "OK"
}
