//! Error types module
//!
//! All errors that can reach the HTTP caller are unified under `AppError`.
//! Only input rejections reach the caller. Errors raised while processing
//! events in the background are logged by the component that observed them.

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "MALFORMED_INPUT")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request body is not well-formed XML.
    #[error("{0}")]
    MalformedInput(String),

    /// The request body parsed but carried no recognized events.
    #[error("{0}")]
    InvalidEnvelope(String),
}

/// Static metadata for each variant: (http_status, error_code).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str) {
    match err {
        AppError::MalformedInput(_) => (400, "MALFORMED_INPUT"),
        AppError::InvalidEnvelope(_) => (400, "INVALID_ENVELOPE"),
    }
}

impl AppError {
    /// Get the error type name for log fields
    pub fn error_type(&self) -> &str {
        match self {
            AppError::MalformedInput(_) => "MalformedInput",
            AppError::InvalidEnvelope(_) => "InvalidEnvelope",
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn client_message(&self) -> String {
        match self {
            AppError::MalformedInput(ref msg) | AppError::InvalidEnvelope(ref msg) => msg.clone(),
        }
    }
}
