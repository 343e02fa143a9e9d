//! Synchronous, acks-all producer for the `order_events` topic.

use std::time::Duration;

use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use serde::Deserialize;

use crate::{BusError, OrderEvent};

#[derive(Debug, Clone, Deserialize)]
pub struct ProducerConfig {
    pub brokers: String,
    pub topic: String,
    #[serde(with = "humantime_serde", default = "default_send_timeout")]
    pub send_timeout: Duration,
}

fn default_send_timeout() -> Duration {
    Duration::from_secs(5)
}

pub struct BusProducer {
    inner: FutureProducer,
    topic: String,
    send_timeout: Duration,
}

impl BusProducer {
    pub fn new(config: &ProducerConfig) -> Result<Self, BusError> {
        let inner: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("acks", "all")
            .set("enable.idempotence", "false")
            // Default partitioner hashes the key, so events sharing an
            // `order_id` land on the same partition.
            .set("partitioner", "consistent_random")
            .create()?;

        Ok(Self {
            inner,
            topic: config.topic.clone(),
            send_timeout: config.send_timeout,
        })
    }

    /// Publishes one `order_events` record, awaiting broker acknowledgement
    /// before returning. Calls are not pipelined against each other by this
    /// type; the caller (the outbox publisher) sequences them as needed.
    pub async fn publish(&self, event: &OrderEvent) -> Result<(), BusError> {
        let key = event.key();
        let payload = event.to_json()?;
        let record = FutureRecord::to(&self.topic).key(&key).payload(&payload);

        self.inner
            .send(record, self.send_timeout)
            .await
            .map_err(|(err, _record)| err)?;

        tracing::debug!(order_id = event.order_id, status = %event.status, "published order event");
        Ok(())
    }
}
