//! Tracing initialization
//!
//! Logs are structured: JSON lines in deployed environments, human-readable
//! output for local development.

mod init_basic;

pub use init_basic::{init_telemetry, TelemetryConfig};
