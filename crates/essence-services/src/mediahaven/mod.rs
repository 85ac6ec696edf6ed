//! MediaHaven metadata access.

#[cfg(feature = "mediahaven")]
mod client;
mod models;

use async_trait::async_trait;

#[cfg(feature = "mediahaven")]
pub use client::{MediahavenClient, MediahavenError};
pub use models::{Administrative, Dynamic, MediaObject, Technical};

/// Result of looking up a fragment.
#[derive(Debug, Clone)]
pub enum LookupOutcome {
    Found(MediaObject),
    /// MediaHaven answered 400 or 404 for the fragment.
    NotFound { detail: String },
    /// Token acquisition, network, or unexpected-status failure.
    TransportError(String),
}

/// Source of fragment metadata.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    async fn get_fragment(&self, fragment_id: &str) -> LookupOutcome;
}
