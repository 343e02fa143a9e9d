//! Consumer-group driver for the `order_events` topic: starts from the
//! earliest offset and commits on `mark`, matching the "at-least-once,
//! idempotent consumer" contract the outbox publisher relies on.

use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message as _;
use rdkafka::ClientConfig;
use serde::Deserialize;

use crate::{BusError, OrderEvent};

#[derive(Debug, Clone, Deserialize)]
pub struct ConsumerConfig {
    pub brokers: String,
    pub topic: String,
    pub group_id: String,
}

pub struct BusConsumer {
    inner: StreamConsumer,
}

impl BusConsumer {
    pub fn new(config: &ConsumerConfig) -> Result<Self, BusError> {
        let inner: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .create()?;

        inner.subscribe(&[config.topic.as_str()])?;

        Ok(Self { inner })
    }

    /// Awaits the next message and decodes it as an [`OrderEvent`]. Returns
    /// the event alongside an owned copy of its raw Kafka message so the
    /// caller can `mark` it after processing.
    pub async fn recv(&self) -> Result<(OrderEvent, rdkafka::message::BorrowedMessage<'_>), BusError> {
        let message = self.inner.recv().await?;
        let payload = message.payload().ok_or(BusError::MissingPayload)?;
        let event = OrderEvent::from_json(payload)?;
        Ok((event, message))
    }

    /// Commits the offset of `message`, marking it (and everything before
    /// it, for this partition) as processed.
    pub fn mark(&self, message: &rdkafka::message::BorrowedMessage<'_>) -> Result<(), BusError> {
        self.inner.commit_message(message, CommitMode::Async)?;
        Ok(())
    }
}
