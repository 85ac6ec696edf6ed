//! Essence Infrastructure Library
//!
//! Shared infrastructure components used by the Essence services:
//! - Middleware (request ID)
//! - Tracing initialization
//! - Error response body
//! - Linear retry policy

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

pub mod error;
pub mod retry;

// Re-export commonly used types
#[cfg(feature = "middleware")]
pub use middleware::{request_id_middleware, RequestId, REQUEST_ID_HEADER};

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, TelemetryConfig};

pub use error::ErrorResponse;
pub use retry::{LinearBackoff, RetryExhausted};
