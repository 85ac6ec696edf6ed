use essence_core::models::ArchivedEventTypes;

use crate::job_queue::EventJobQueue;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub archived_event_types: ArchivedEventTypes,
    pub job_queue: EventJobQueue,
}

impl AppState {
    pub fn new(archived_event_types: ArchivedEventTypes, job_queue: EventJobQueue) -> Self {
        Self {
            archived_event_types,
            job_queue,
        }
    }
}
