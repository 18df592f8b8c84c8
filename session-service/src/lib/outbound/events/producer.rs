use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::FutureProducer;
use rdkafka::producer::FutureRecord;
use rdkafka::util::Timeout;
use thiserror::Error;

use crate::config::KafkaConfig;
use crate::domain::identity::errors::NotifierError;
use crate::domain::identity::events::PasswordResetRequestedEvent;
use crate::domain::identity::ports::ResetNotifier;
use crate::outbound::events::messages::NotificationMessage;

#[derive(Debug, Error)]
pub enum KafkaProducerError {
    #[error("Failed to send message to Kafka: {0}")]
    SendError(String),

    #[error("Failed to serialize message: {0}")]
    SerializationError(String),
}

impl From<KafkaProducerError> for NotifierError {
    fn from(err: KafkaProducerError) -> Self {
        match err {
            KafkaProducerError::SerializationError(msg) => NotifierError::SerializationFailed(msg),
            KafkaProducerError::SendError(msg) => NotifierError::DeliveryFailed(msg),
        }
    }
}

/// Hands reset links to the mail worker over Kafka.
pub struct KafkaResetNotifier {
    producer: FutureProducer,
    topic: String,
    timeout: Duration,
}

impl KafkaResetNotifier {
    /// Create a Kafka producer with at-least-once delivery.
    ///
    /// # Notes:
    /// - `acks=all` with `enable.idempotence=true`, so retries never duplicate
    /// - Messages are keyed by user id; one user's resets stay ordered
    pub fn new(config: &KafkaConfig) -> Result<Self, anyhow::Error> {
        tracing::info!(
            brokers = %config.brokers,
            topic = %config.topic,
            "Initializing Kafka producer for reset notifications"
        );

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("message.timeout.ms", "30000")
            .set("enable.idempotence", "true")
            .set("acks", "all")
            .set("retries", "10")
            .set("max.in.flight.requests.per.connection", "5")
            .set("retry.backoff.ms", "100")
            .create()?;

        Ok(Self {
            producer,
            topic: config.topic.to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    async fn publish(
        &self,
        user_id: &str,
        message: &NotificationMessage,
    ) -> Result<(), KafkaProducerError> {
        let payload = serde_json::to_string(message)
            .map_err(|e| KafkaProducerError::SerializationError(e.to_string()))?;

        let record = FutureRecord::to(&self.topic).key(user_id).payload(&payload);

        self.producer
            .send(record, Timeout::After(self.timeout))
            .await
            .map(|_| {
                tracing::debug!(topic = %self.topic, user_id, "Notification published");
            })
            .map_err(|(err, _)| KafkaProducerError::SendError(err.to_string()))
    }
}

#[async_trait]
impl ResetNotifier for KafkaResetNotifier {
    async fn send_reset_link(
        &self,
        event: &PasswordResetRequestedEvent,
    ) -> Result<(), NotifierError> {
        let message = NotificationMessage::from(event);

        self.publish(&event.user_id, &message)
            .await
            .map_err(NotifierError::from)
    }
}
