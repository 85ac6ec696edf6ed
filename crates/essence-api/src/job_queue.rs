use std::sync::Arc;

use essence_core::models::EventRecord;
use essence_services::EventProcessor;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use tracing::Instrument;

/// Runs accepted event batches in the background.
///
/// Each batch is processed sequentially by one task; at most
/// `max_concurrent` batches run at once, later ones wait for a permit.
#[derive(Clone)]
pub struct EventJobQueue {
    processor: Arc<EventProcessor>,
    semaphore: Arc<Semaphore>,
    tracker: TaskTracker,
}

impl EventJobQueue {
    pub fn new(processor: Arc<EventProcessor>, max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        tracing::info!(max_concurrent, "Event job queue initialized");

        Self {
            processor,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            tracker: TaskTracker::new(),
        }
    }

    /// Queue a batch for processing. Returns immediately.
    pub fn submit(&self, events: Vec<EventRecord>, request_id: Option<String>) {
        let processor = self.processor.clone();
        let semaphore = self.semaphore.clone();
        let span = tracing::info_span!(
            "event_batch",
            request_id = request_id.as_deref().unwrap_or("-"),
            events = events.len()
        );

        self.tracker.spawn(
            async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        tracing::error!("Job queue closed, dropping event batch");
                        return;
                    }
                };
                let outcomes = processor.process_events(&events).await;
                tracing::info!(outcomes = ?outcomes, "Event batch processed");
            }
            .instrument(span),
        );
    }

    /// Wait for every queued batch to finish.
    ///
    /// The queue keeps accepting batches afterwards.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Number of batches queued or running.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }
}
