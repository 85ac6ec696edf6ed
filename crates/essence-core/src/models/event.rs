use std::collections::BTreeSet;
use std::fmt;

use crate::constants::{DEFAULT_ARCHIVED_EVENT_TYPES, OUTCOME_OK};

/// The set of event types that mean "object has finished archiving".
///
/// The set is domain-versioned and has grown over time, so it is loaded from
/// configuration rather than fixed in code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedEventTypes(BTreeSet<String>);

impl ArchivedEventTypes {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            types
                .into_iter()
                .map(Into::into)
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        )
    }

    /// Parse a comma-separated list, e.g. `FLOW.ARCHIVED,RECORDS.FLOW.ARCHIVED`.
    pub fn parse_list(value: &str) -> Self {
        Self::new(value.split(','))
    }

    pub fn contains(&self, event_type: &str) -> bool {
        self.0.contains(event_type)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// An event is a valid archive event when its type is recognized and it
    /// identifies a fragment.
    pub fn is_valid_archive_event(&self, event_type: &str, fragment_id: &str) -> bool {
        self.contains(event_type) && !fragment_id.is_empty()
    }
}

impl Default for ArchivedEventTypes {
    fn default() -> Self {
        Self::new(DEFAULT_ARCHIVED_EVENT_TYPES.iter().copied())
    }
}

impl fmt::Display for ArchivedEventTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        write!(f, "{}", joined.join(","))
    }
}

/// Outcome check shared by the parser and the orchestrator.
pub fn has_success_outcome(event_outcome: &str) -> bool {
    event_outcome == OUTCOME_OK
}

/// Raw field values of one PREMIS event, as found in the envelope.
///
/// Absent fields are empty strings; required-ness is decided by classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFields {
    pub event_type: String,
    pub event_id: String,
    pub event_detail: String,
    pub event_datetime: String,
    pub event_outcome: String,
    pub fragment_id: String,
    pub external_id: String,
}

/// One archival notification parsed from an inbound request.
///
/// Classification flags are computed once at construction and cannot drift
/// from the field values: the fields are only readable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    fields: EventFields,
    raw_xml: String,
    is_valid_archive_event: bool,
    has_success_outcome: bool,
}

impl EventRecord {
    pub fn new(fields: EventFields, raw_xml: String, archived_types: &ArchivedEventTypes) -> Self {
        let is_valid_archive_event =
            archived_types.is_valid_archive_event(&fields.event_type, &fields.fragment_id);
        let has_success_outcome = has_success_outcome(&fields.event_outcome);
        Self {
            fields,
            raw_xml,
            is_valid_archive_event,
            has_success_outcome,
        }
    }

    pub fn event_type(&self) -> &str {
        &self.fields.event_type
    }

    pub fn event_id(&self) -> &str {
        &self.fields.event_id
    }

    pub fn event_detail(&self) -> &str {
        &self.fields.event_detail
    }

    pub fn event_datetime(&self) -> &str {
        &self.fields.event_datetime
    }

    pub fn event_outcome(&self) -> &str {
        &self.fields.event_outcome
    }

    pub fn fragment_id(&self) -> &str {
        &self.fields.fragment_id
    }

    pub fn external_id(&self) -> &str {
        &self.fields.external_id
    }

    pub fn fields(&self) -> &EventFields {
        &self.fields
    }

    /// Exact source text of the `event` element in the inbound envelope.
    pub fn raw_xml(&self) -> &str {
        &self.raw_xml
    }

    pub fn is_valid_archive_event(&self) -> bool {
        self.is_valid_archive_event
    }

    pub fn has_success_outcome(&self) -> bool {
        self.has_success_outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(event_type: &str, fragment_id: &str, outcome: &str) -> EventFields {
        EventFields {
            event_type: event_type.to_string(),
            event_id: "111".to_string(),
            event_detail: "Ingest".to_string(),
            event_datetime: "2019-03-30T05:28:40Z".to_string(),
            event_outcome: outcome.to_string(),
            fragment_id: fragment_id.to_string(),
            external_id: "pid1".to_string(),
        }
    }

    #[test]
    fn test_default_types() {
        let types = ArchivedEventTypes::default();
        assert!(types.contains("FLOW.ARCHIVED"));
        assert!(types.contains("RECORDS.FLOW.ARCHIVED"));
        assert!(!types.contains("EXPORT"));
    }

    #[test]
    fn test_parse_list_trims_and_skips_empty() {
        let types = ArchivedEventTypes::parse_list(" FLOW.ARCHIVED , ,ARCHIVED.ON.TAPE ");
        assert!(types.contains("FLOW.ARCHIVED"));
        assert!(types.contains("ARCHIVED.ON.TAPE"));
        assert_eq!(types.iter().count(), 2);
        assert_eq!(types.to_string(), "ARCHIVED.ON.TAPE,FLOW.ARCHIVED");
    }

    #[test]
    fn test_valid_archive_event() {
        let types = ArchivedEventTypes::default();
        let record = EventRecord::new(
            fields("RECORDS.FLOW.ARCHIVED", "a1b2c3", "OK"),
            String::new(),
            &types,
        );
        assert!(record.is_valid_archive_event());
        assert!(record.has_success_outcome());
    }

    #[test]
    fn test_missing_fragment_is_not_valid() {
        let types = ArchivedEventTypes::default();
        let record = EventRecord::new(fields("FLOW.ARCHIVED", "", "OK"), String::new(), &types);
        assert!(!record.is_valid_archive_event());
    }

    #[test]
    fn test_unrecognized_type_is_not_valid() {
        let types = ArchivedEventTypes::default();
        let record = EventRecord::new(fields("EXPORT", "x", "OK"), String::new(), &types);
        assert!(!record.is_valid_archive_event());
        assert!(record.has_success_outcome());
    }

    #[test]
    fn test_outcome_is_case_sensitive() {
        assert!(has_success_outcome("OK"));
        assert!(!has_success_outcome("ok"));
        assert!(!has_success_outcome("NOK"));
        assert!(!has_success_outcome(""));
    }

    #[test]
    fn test_classification_is_stable() {
        let types = ArchivedEventTypes::default();
        for (event_type, fragment_id, outcome) in [
            ("FLOW.ARCHIVED", "a1", "OK"),
            ("FLOW.ARCHIVED", "", "NOK"),
            ("EXPORT", "a1", "OK"),
            ("", "", ""),
        ] {
            let record =
                EventRecord::new(fields(event_type, fragment_id, outcome), String::new(), &types);
            let recomputed = EventRecord::new(record.fields().clone(), String::new(), &types);
            assert_eq!(
                record.is_valid_archive_event(),
                recomputed.is_valid_archive_event()
            );
            assert_eq!(record.has_success_outcome(), recomputed.has_success_outcome());
            assert_eq!(
                record.is_valid_archive_event(),
                types.is_valid_archive_event(record.event_type(), record.fragment_id())
            );
        }
    }
}
