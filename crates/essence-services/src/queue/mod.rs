//! Message publishing with bounded linear-backoff retry.

#[cfg(feature = "rabbitmq")]
mod rabbit;

use std::sync::Arc;

use async_trait::async_trait;
use essence_infra::LinearBackoff;

#[cfg(feature = "rabbitmq")]
pub use rabbit::RabbitPublisher;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Cannot connect to broker: {0}")]
    Connection(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Broker did not confirm the message")]
    NotConfirmed,
}

/// A single publish attempt to an exchange.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    async fn publish(&self, body: &[u8], exchange: &str, routing_key: &str)
        -> Result<(), PublishError>;
}

/// Publishes messages, retrying failed attempts with linear backoff.
#[derive(Clone)]
pub struct QueueService {
    publisher: Arc<dyn MessagePublisher>,
    backoff: LinearBackoff,
}

impl QueueService {
    pub fn new(publisher: Arc<dyn MessagePublisher>, backoff: LinearBackoff) -> Self {
        Self { publisher, backoff }
    }

    /// Publish `body`, returning whether the broker accepted it.
    ///
    /// When every attempt fails the body is logged at error level with
    /// `critical = true` so the message can be republished by hand.
    pub async fn publish(&self, body: &str, exchange: &str, routing_key: &str) -> bool {
        let result = self
            .backoff
            .run("publish_message", |_| {
                self.publisher.publish(body.as_bytes(), exchange, routing_key)
            })
            .await;

        match result {
            Ok(()) => {
                tracing::info!(
                    exchange = %exchange,
                    routing_key = %routing_key,
                    "Message published"
                );
                true
            }
            Err(exhausted) => {
                tracing::error!(
                    critical = true,
                    exchange = %exchange,
                    routing_key = %routing_key,
                    attempts = exhausted.attempts,
                    error = %exhausted.last_error,
                    message = %body,
                    "Message will not be delivered, manual publish needed."
                );
                false
            }
        }
    }
}
