/// Namespace of the PREMIS v2 event elements in the inbound envelope.
pub const PREMIS_NAMESPACE: &str = "info:lc/xmlns/premis-v2";

/// Namespace of the outbound `essenceArchivedEvent` document.
pub const VRT_NAMESPACE: &str = "http://www.vrt.be/mig/viaa/api";

/// Outcome value marking a successful archival.
pub const OUTCOME_OK: &str = "OK";

/// Identifier type of the MediaHaven fragment in `linkingObjectIdentifier`.
pub const MEDIAHAVEN_ID_TYPE: &str = "MEDIAHAVEN_ID";

/// Identifier type of the external (persistent) id in `linkingObjectIdentifier`.
pub const EXTERNAL_ID_TYPE: &str = "EXTERNAL_ID";

/// Organisation placeholder used in error routing keys when the lookup fails.
pub const UNKNOWN_ORGANISATION: &str = "unknown";

/// Archive-event types recognized when `ARCHIVED_EVENT_TYPES` is not set.
pub const DEFAULT_ARCHIVED_EVENT_TYPES: &[&str] = &["FLOW.ARCHIVED", "RECORDS.FLOW.ARCHIVED"];
