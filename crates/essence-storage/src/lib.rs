//! Essence Storage Library
//!
//! This crate provides the object-storage abstraction used to clean up
//! temporary copies of archived objects, and its S3 implementation.
//!
//! Unlike a single-bucket store, every operation names its bucket: archived
//! objects live in whichever bucket MediaHaven reports for the fragment.

pub mod factory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ObjectStorage, StorageError, StorageResult};
