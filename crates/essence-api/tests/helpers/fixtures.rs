//! PREMIS envelopes shared with the services crate tests.

pub const SINGLE_EVENT: &str =
    include_str!("../../../essence-services/tests/resources/single_premis_event.xml");
pub const SINGLE_EVENT_NOK: &str =
    include_str!("../../../essence-services/tests/resources/single_premis_event_nok.xml");
pub const MULTI_EVENT: &str =
    include_str!("../../../essence-services/tests/resources/multi_premis_event.xml");
pub const NO_EVENTS: &str =
    include_str!("../../../essence-services/tests/resources/no_premis_events.xml");
pub const MALFORMED: &str =
    include_str!("../../../essence-services/tests/resources/malformed_event.xml");
