use std::sync::Arc;

use essence_core::constants::UNKNOWN_ORGANISATION;
use essence_core::models::FragmentMetadata;

use crate::mediahaven::{LookupOutcome, MetadataLookup};

/// Turns MediaHaven lookups into notification metadata.
#[derive(Clone)]
pub struct MetadataResolver {
    lookup: Arc<dyn MetadataLookup>,
}

impl MetadataResolver {
    pub fn new(lookup: Arc<dyn MetadataLookup>) -> Self {
        Self { lookup }
    }

    /// Metadata for `fragment_id`, or `None` when the fragment is unknown,
    /// the lookup failed, or a required value is missing.
    pub async fn resolve(&self, fragment_id: &str) -> Option<FragmentMetadata> {
        match self.lookup.get_fragment(fragment_id).await {
            LookupOutcome::Found(object) => {
                let owned = |value: Option<&str>| value.map(str::to_string);
                match FragmentMetadata::try_new(
                    owned(object.external_id()),
                    owned(object.md5()),
                    owned(object.s3_bucket()),
                    owned(object.s3_object_key()),
                ) {
                    Ok(metadata) => Some(metadata),
                    Err(missing) => {
                        tracing::warn!(
                            fragment_id = %fragment_id,
                            missing_fields = %missing,
                            "Required fields not found in the MediaHaven object"
                        );
                        None
                    }
                }
            }
            LookupOutcome::NotFound { detail } => {
                tracing::error!(
                    fragment_id = %fragment_id,
                    detail = %detail,
                    "Fragment not found in MediaHaven"
                );
                None
            }
            LookupOutcome::TransportError(error) => {
                tracing::error!(
                    fragment_id = %fragment_id,
                    error = %error,
                    "MediaHaven lookup failed"
                );
                None
            }
        }
    }

    /// Owning organisation of a fragment, `unknown` if it cannot be determined.
    pub async fn organisation_name(&self, fragment_id: &str) -> String {
        match self.lookup.get_fragment(fragment_id).await {
            LookupOutcome::Found(object) => match object.organisation_name() {
                Some(name) if !name.trim().is_empty() => name.to_string(),
                _ => {
                    tracing::warn!(fragment_id = %fragment_id, "Fragment has no organisation name");
                    UNKNOWN_ORGANISATION.to_string()
                }
            },
            LookupOutcome::NotFound { detail } => {
                tracing::warn!(
                    fragment_id = %fragment_id,
                    detail = %detail,
                    "Organisation lookup found no fragment"
                );
                UNKNOWN_ORGANISATION.to_string()
            }
            LookupOutcome::TransportError(error) => {
                tracing::warn!(
                    fragment_id = %fragment_id,
                    error = %error,
                    "Organisation lookup failed"
                );
                UNKNOWN_ORGANISATION.to_string()
            }
        }
    }
}
