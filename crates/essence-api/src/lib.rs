//! Essence API Library
//!
//! This crate provides the HTTP handlers, background batch dispatch and
//! application setup.

mod handlers;
mod job_queue;

pub mod error;
pub mod setup;
pub mod state;

pub use error::HttpAppError;
pub use handlers::event::EventAccepted;
pub use job_queue::EventJobQueue;
pub use setup::routes::setup_routes;
pub use state::AppState;
