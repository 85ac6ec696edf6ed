//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`; errors render as
//! `{"detail": "NOK: <message>"}` with the status from [`ErrorMetadata`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use essence_core::{AppError, ErrorMetadata};
use essence_infra::ErrorResponse;
use essence_services::ParseError;

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from essence-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<ParseError> for HttpAppError {
    fn from(err: ParseError) -> Self {
        let app = match err {
            ParseError::MalformedInput(msg) => AppError::MalformedInput(msg),
            err @ ParseError::NoEventsFound { .. } => AppError::InvalidEnvelope(err.to_string()),
        };
        HttpAppError(app)
    }
}

fn log_error(error: &AppError) {
    tracing::warn!(
        error = %error,
        error_type = error.error_type(),
        error_code = error.error_code(),
        "Request rejected"
    );
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::BAD_REQUEST);

        log_error(app_error);

        (status, Json(ErrorResponse::nok(app_error.client_message()))).into_response()
    }
}
