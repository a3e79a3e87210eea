//! Kafka consumer implementation
//!
//! Binds the message-source contract to a Kafka consumer group with
//! manual offset commits. One consumer, one topic; dropping the source
//! releases the group membership.

use crate::adapters::messaging::traits::{DeliveredMessage, MessageSource};
use crate::config::KafkaConfig;
use crate::domain::{PorterError, Result};
use async_trait::async_trait;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::{ClientConfig, Message, Offset, TopicPartitionList};
use std::time::Duration;

/// Kafka-backed message source
pub struct KafkaSource {
    consumer: StreamConsumer,
}

impl KafkaSource {
    /// Create a consumer subscribed to the export topic
    ///
    /// Auto-commit is disabled: offsets move only through [`MessageSource::commit`].
    ///
    /// # Errors
    ///
    /// Returns an error if the consumer cannot be created or the
    /// subscription fails.
    pub fn new(config: &KafkaConfig) -> Result<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("auto.offset.reset", "earliest")
            .set("enable.auto.commit", "false")
            .set(
                "max.poll.interval.ms",
                config.max_poll_interval_ms.to_string(),
            )
            .set("session.timeout.ms", config.session_timeout_ms.to_string())
            .create()
            .map_err(|e| PorterError::Consumer(format!("Failed to create consumer: {e}")))?;

        consumer
            .subscribe(&[config.topic.as_str()])
            .map_err(|e| PorterError::Consumer(format!("Failed to subscribe to topic: {e}")))?;

        tracing::info!(
            topic = %config.topic,
            group_id = %config.group_id,
            "Kafka consumer subscribed"
        );

        Ok(Self { consumer })
    }
}

#[async_trait]
impl MessageSource for KafkaSource {
    async fn poll(&self, timeout: Duration) -> Result<Option<DeliveredMessage>> {
        match tokio::time::timeout(timeout, self.consumer.recv()).await {
            Err(_elapsed) => Ok(None),
            Ok(Err(e)) => Err(PorterError::Consumer(e.to_string())),
            Ok(Ok(message)) => Ok(Some(DeliveredMessage {
                payload: message.payload().unwrap_or_default().to_vec(),
                topic: message.topic().to_string(),
                partition: message.partition(),
                offset: message.offset(),
            })),
        }
    }

    async fn commit(&self, message: &DeliveredMessage) -> Result<()> {
        let mut positions = TopicPartitionList::new();
        positions
            .add_partition_offset(
                &message.topic,
                message.partition,
                Offset::Offset(message.offset + 1),
            )
            .map_err(|e| PorterError::Consumer(format!("Invalid commit position: {e}")))?;

        self.consumer
            .commit(&positions, CommitMode::Sync)
            .map_err(|e| PorterError::Consumer(format!("Offset commit failed: {e}")))?;

        tracing::debug!(
            topic = %message.topic,
            partition = message.partition,
            offset = message.offset,
            "Offset committed"
        );
        Ok(())
    }
}
