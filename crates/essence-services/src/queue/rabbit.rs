use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, ConfirmSelectOptions};
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use tokio::sync::Mutex;

use super::{MessagePublisher, PublishError};

/// AMQP delivery mode for messages that survive a broker restart.
const PERSISTENT: u8 = 2;

struct Session {
    connection: Connection,
    channel: Channel,
}

impl Session {
    fn is_open(&self) -> bool {
        self.connection.status().connected() && self.channel.status().connected()
    }
}

/// Holds the current session, tagged with the generation it was opened in.
///
/// A publish that fails only discards the session it actually used; a newer
/// one opened meanwhile by a concurrent batch is left alone.
struct SessionSlot<T> {
    current: Option<(u64, T)>,
    opened: u64,
}

impl<T> SessionSlot<T> {
    fn new() -> Self {
        Self {
            current: None,
            opened: 0,
        }
    }

    fn get(&self) -> Option<(u64, &T)> {
        self.current.as_ref().map(|(generation, value)| (*generation, value))
    }

    fn store(&mut self, value: T) -> u64 {
        self.opened += 1;
        self.current = Some((self.opened, value));
        self.opened
    }

    fn take(&mut self) -> Option<T> {
        self.current.take().map(|(_, value)| value)
    }

    fn take_if(&mut self, generation: u64) -> Option<T> {
        match self.current {
            Some((current, _)) if current == generation => self.take(),
            _ => None,
        }
    }
}

/// RabbitMQ publisher with a lazily opened, reused connection.
///
/// Publishes are persistent and wait for the broker's confirm. A failed
/// attempt drops the session it used so the next one reconnects.
pub struct RabbitPublisher {
    uri: String,
    session: Mutex<SessionSlot<Session>>,
}

impl RabbitPublisher {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            session: Mutex::new(SessionSlot::new()),
        }
    }

    async fn open_session(&self) -> Result<Session, PublishError> {
        let connection = Connection::connect(&self.uri, ConnectionProperties::default())
            .await
            .map_err(|e| PublishError::Connection(e.to_string()))?;
        let channel = connection
            .create_channel()
            .await
            .map_err(|e| PublishError::Connection(e.to_string()))?;
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(|e| PublishError::Connection(e.to_string()))?;

        tracing::info!("Connected to RabbitMQ");
        Ok(Session {
            connection,
            channel,
        })
    }

    async fn channel(&self) -> Result<(u64, Channel), PublishError> {
        let mut slot = self.session.lock().await;
        if let Some((generation, session)) = slot.get().filter(|(_, session)| session.is_open()) {
            return Ok((generation, session.channel.clone()));
        }
        let session = self.open_session().await?;
        let channel = session.channel.clone();
        if let Some(stale) = slot.take() {
            close_quietly(stale, "reconnect").await;
        }
        Ok((slot.store(session), channel))
    }

    async fn reset(&self, generation: u64) {
        let failed = self.session.lock().await.take_if(generation);
        if let Some(session) = failed {
            close_quietly(session, "reset").await;
        }
    }

    /// Close the connection, if one is open.
    pub async fn close(&self) {
        let session = self.session.lock().await.take();
        if let Some(session) = session {
            match session.connection.close(200, "shutdown").await {
                Ok(()) => tracing::info!("RabbitMQ connection closed"),
                Err(e) => tracing::warn!(error = %e, "Failed to close RabbitMQ connection"),
            }
        }
    }

    async fn send(
        channel: &Channel,
        body: &[u8],
        exchange: &str,
        routing_key: &str,
    ) -> Result<(), PublishError> {
        let confirm = channel
            .basic_publish(
                exchange,
                routing_key,
                BasicPublishOptions::default(),
                body,
                BasicProperties::default().with_delivery_mode(PERSISTENT),
            )
            .await
            .map_err(|e| PublishError::Publish(e.to_string()))?
            .await
            .map_err(|e| PublishError::Publish(e.to_string()))?;

        if confirm.is_nack() {
            return Err(PublishError::NotConfirmed);
        }
        Ok(())
    }
}

async fn close_quietly(session: Session, reason: &str) {
    if let Err(e) = session.connection.close(200, reason).await {
        tracing::debug!(error = %e, "Closing RabbitMQ connection failed");
    }
}

#[async_trait]
impl MessagePublisher for RabbitPublisher {
    async fn publish(
        &self,
        body: &[u8],
        exchange: &str,
        routing_key: &str,
    ) -> Result<(), PublishError> {
        let (generation, channel) = self.channel().await?;
        let result = Self::send(&channel, body, exchange, routing_key).await;
        if result.is_err() {
            self.reset(generation).await;
        }
        result
    }
}
