//! HTTP error response body
//!
//! The webhook caller only ever sees `{"detail": "..."}`; the detail is
//! prefixed with `NOK: ` so the sending system can tell a rejected delivery
//! from a transport failure.

use serde::{Deserialize, Serialize};

/// Standard error response format for HTTP APIs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn nok(message: impl std::fmt::Display) -> Self {
        Self {
            detail: format!("NOK: {}", message),
        }
    }
}
