//! Per-event decision flow.
//!
//! Failure-outcome events go to the error exchange. Successful archive
//! events get their metadata resolved, an `essenceArchivedEvent` published,
//! and the temporary S3 object removed. Anything else is dropped.

use std::sync::Arc;

use essence_core::constants::UNKNOWN_ORGANISATION;
use essence_core::models::EventRecord;
use essence_core::RabbitConfig;
use essence_storage::ObjectStorage;

use crate::notification::build_notification;
use crate::queue::QueueService;
use crate::resolver::MetadataResolver;

/// Exchanges and routing key used when publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingConfig {
    /// Exchange for `essenceArchivedEvent` notifications.
    pub exchange: String,
    /// Routing key for `essenceArchivedEvent` notifications.
    pub routing_key: String,
    /// Exchange for failure-outcome events.
    pub error_exchange: String,
}

impl From<&RabbitConfig> for RoutingConfig {
    fn from(config: &RabbitConfig) -> Self {
        Self {
            exchange: config.exchange.clone(),
            routing_key: config.queue.clone(),
            error_exchange: config.exchange_nok.clone(),
        }
    }
}

/// What happened to a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Failure-outcome event forwarded to the error exchange.
    ErrorRouted { delivered: bool },
    /// Not a recognized archive event.
    Dropped,
    /// Metadata could not be resolved; nothing published.
    Suppressed,
    /// Notification published; `cleaned_up` reports the S3 delete.
    Published { cleaned_up: bool },
    /// Notification could not be delivered; the S3 object is kept.
    Undelivered,
}

/// Routing key for a failure-outcome event, lowercased.
pub fn error_routing_key(organisation: &str, event_type: &str) -> String {
    format!("NOK.{}.{}", organisation, event_type).to_lowercase()
}

pub struct EventProcessor {
    resolver: MetadataResolver,
    queue: QueueService,
    storage: Arc<dyn ObjectStorage>,
    routing: RoutingConfig,
}

impl EventProcessor {
    pub fn new(
        resolver: MetadataResolver,
        queue: QueueService,
        storage: Arc<dyn ObjectStorage>,
        routing: RoutingConfig,
    ) -> Self {
        Self {
            resolver,
            queue,
            storage,
            routing,
        }
    }

    /// Process events one after another in the given order.
    ///
    /// A failing event never stops the ones after it.
    pub async fn process_events(&self, events: &[EventRecord]) -> Vec<ProcessOutcome> {
        let mut outcomes = Vec::with_capacity(events.len());
        for event in events {
            outcomes.push(self.process_event(event).await);
        }
        outcomes
    }

    #[tracing::instrument(
        skip(self, event),
        fields(
            event_id = %event.event_id(),
            event_type = %event.event_type(),
            fragment_id = %event.fragment_id(),
        )
    )]
    pub async fn process_event(&self, event: &EventRecord) -> ProcessOutcome {
        if !event.has_success_outcome() {
            return self.route_failure(event).await;
        }

        if !event.is_valid_archive_event() {
            tracing::debug!(
                event_detail = %event.event_detail(),
                "Dropping non-archive event"
            );
            return ProcessOutcome::Dropped;
        }

        tracing::info!(
            external_id = %event.external_id(),
            event_detail = %event.event_detail(),
            "Processing archive event"
        );

        let Some(metadata) = self.resolver.resolve(event.fragment_id()).await else {
            return ProcessOutcome::Suppressed;
        };

        let body = match build_notification(&metadata, event.event_datetime()) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "Failed to build essenceArchivedEvent");
                return ProcessOutcome::Undelivered;
            }
        };

        let delivered = self
            .queue
            .publish(&body, &self.routing.exchange, &self.routing.routing_key)
            .await;
        if !delivered {
            tracing::warn!(
                s3_bucket = %metadata.s3_bucket(),
                s3_key = %metadata.s3_object_key(),
                "Keeping S3 object, notification was not delivered"
            );
            return ProcessOutcome::Undelivered;
        }

        let cleaned_up = match self
            .storage
            .delete(metadata.s3_bucket(), metadata.s3_object_key())
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    s3_bucket = %metadata.s3_bucket(),
                    s3_key = %metadata.s3_object_key(),
                    "Failed to delete archived S3 object"
                );
                false
            }
        };

        ProcessOutcome::Published { cleaned_up }
    }

    async fn route_failure(&self, event: &EventRecord) -> ProcessOutcome {
        if event.fragment_id().is_empty() && event.event_id().is_empty() {
            tracing::debug!(
                event_outcome = %event.event_outcome(),
                "Dropping failure event without identifiers"
            );
            return ProcessOutcome::Dropped;
        }

        let organisation = if event.fragment_id().is_empty() {
            UNKNOWN_ORGANISATION.to_string()
        } else {
            self.resolver.organisation_name(event.fragment_id()).await
        };
        let routing_key = error_routing_key(&organisation, event.event_type());

        tracing::warn!(
            event_outcome = %event.event_outcome(),
            routing_key = %routing_key,
            "Routing failure event to error exchange"
        );

        let delivered = self
            .queue
            .publish(event.raw_xml(), &self.routing.error_exchange, &routing_key)
            .await;
        ProcessOutcome::ErrorRouted { delivered }
    }
}
