//! Domain models for archival events and fragment metadata.

pub mod event;
pub mod fragment;

pub use event::{has_success_outcome, ArchivedEventTypes, EventFields, EventRecord};
pub use fragment::{FragmentMetadata, MetadataField, MissingFields};
