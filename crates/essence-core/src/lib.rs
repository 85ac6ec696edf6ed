//! Essence Core Library
//!
//! This crate provides the domain models, error types and configuration
//! shared by every Essence component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, MediahavenConfig, RabbitConfig, S3Config};
pub use error::{AppError, ErrorMetadata};
pub use models::{EventRecord, FragmentMetadata};
