//! Message-bus adapters: a synchronous, acks-all Kafka producer and a
//! consumer-group driver, plus the `order_events` wire message.
//!
//! Wire framing is owned by `rdkafka`; this crate only fixes the topic's
//! key/value shape and the producer/consumer configuration the rest of the
//! workspace depends on (hash partitioner over the key, earliest-offset
//! consumer groups with auto-commit on mark).

pub mod consumer;
pub mod producer;

pub use consumer::{BusConsumer, ConsumerConfig};
pub use producer::{BusProducer, ProducerConfig};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("kafka error")]
    Kafka(#[from] rdkafka::error::KafkaError),
    #[error("message payload was not valid JSON")]
    Decode(#[from] serde_json::Error),
    #[error("message had no payload")]
    MissingPayload,
}

/// The `order_events` topic's value. `status` is carried as its wire string
/// (e.g. `"awaiting_payment"`) rather than a typed enum, since `bus` sits
/// below `loms` in the dependency graph and must not depend on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub order_id: i64,
    pub status: String,
    pub moment: DateTime<Utc>,
}

impl OrderEvent {
    /// Partition key: the decimal `order_id`, so every event for a given
    /// order lands on the same partition and is observed in order.
    pub fn key(&self) -> String {
        self.order_id.to_string()
    }

    pub fn to_json(&self) -> Result<Vec<u8>, BusError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, BusError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let event = OrderEvent {
            order_id: 42,
            status: "paid".to_owned(),
            moment: Utc::now(),
        };
        let encoded = event.to_json().unwrap();
        let decoded = OrderEvent::from_json(&encoded).unwrap();
        assert_eq!(event, decoded);
        assert_eq!(event.key(), "42");
    }
}
