//! Construction of the external clients and the event processor.

use std::sync::Arc;

use anyhow::{Context, Result};
use essence_core::Config;
use essence_infra::LinearBackoff;
use essence_services::{
    create_storage, EventProcessor, MediahavenClient, MetadataResolver, QueueService,
    RabbitPublisher, RoutingConfig,
};

use crate::job_queue::EventJobQueue;

/// Long-lived handles needed after startup.
pub struct Services {
    pub job_queue: EventJobQueue,
    pub publisher: Arc<RabbitPublisher>,
}

pub fn initialize_services(config: &Config) -> Result<Services> {
    let mediahaven = MediahavenClient::new(config.mediahaven.clone())
        .context("Failed to build MediaHaven client")?;
    tracing::info!(host = %config.mediahaven.host, "MediaHaven client configured");

    let publisher = Arc::new(RabbitPublisher::new(config.rabbit.amqp_uri()));
    tracing::info!(
        host = %config.rabbit.host,
        port = config.rabbit.port,
        exchange = %config.rabbit.exchange,
        error_exchange = %config.rabbit.exchange_nok,
        max_retries = config.rabbit.max_retries,
        retry_interval_secs = config.rabbit.retry_interval_seconds,
        "RabbitMQ publisher configured"
    );

    let storage = create_storage(config).context("Failed to initialize S3 storage")?;

    let processor = EventProcessor::new(
        MetadataResolver::new(Arc::new(mediahaven)),
        QueueService::new(
            publisher.clone(),
            LinearBackoff::new(config.rabbit.retry_interval(), config.rabbit.max_retries),
        ),
        storage,
        RoutingConfig::from(&config.rabbit),
    );

    Ok(Services {
        job_queue: EventJobQueue::new(Arc::new(processor), config.max_concurrent_batches),
        publisher,
    })
}
