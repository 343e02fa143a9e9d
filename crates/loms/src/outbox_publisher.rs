//! Periodic outbox drain: grounded on the source's
//! `order_event_publisher.go` (`Start`/`sendEvents`/`updateEventsStatusesTx`),
//! adapted to `tokio::time::interval` + `CancellationToken` per
//! SPEC_FULL.md §4.8.
//!
//! The dequeue and the status update happen in one `SELECT ... FOR UPDATE
//! SKIP LOCKED` transaction (rather than read-then-separately-write, as the
//! source does against a single-writer Postgres) so that two publisher
//! replicas never double-publish the same batch; see DESIGN.md.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use bus::{BusProducer, OrderEvent};
use storage::{with_tx, Isolation, PoolManager};
use tokio_util::sync::CancellationToken;

use crate::domain::EventStatus;
use crate::repo::outbox as outbox_repo;

pub struct OutboxPublisher {
    pool: Arc<PoolManager>,
    producer: Arc<BusProducer>,
    batch_size: i64,
    period: Duration,
}

impl OutboxPublisher {
    pub fn new(
        pool: Arc<PoolManager>,
        producer: Arc<BusProducer>,
        batch_size: i64,
        period: Duration,
    ) -> Self {
        Self {
            pool,
            producer,
            batch_size,
            period,
        }
    }

    /// Runs until `stop` is cancelled, ticking every `period`.
    pub async fn run(&self, stop: CancellationToken) {
        let mut ticker = tokio::time::interval(self.period);
        loop {
            tokio::select! {
                _ = stop.cancelled() => return,
                _ = ticker.tick() => {
                    if let Err(err) = self.send_events().await {
                        tracing::warn!(error = %err, "outbox publisher tick failed");
                    }
                }
            }
        }
    }

    async fn send_events(&self) -> Result<(), sqlx::Error> {
        let batch_size = self.batch_size;
        let producer = self.producer.clone();
        with_tx(self.pool.writable(), Isolation::Default, |tx| {
            Box::pin(async move {
                let events = outbox_repo::get_unprocessed(&mut **tx, batch_size).await?;
                if events.is_empty() {
                    return Ok(());
                }

                // Once an order has one failed publish within this batch, every
                // later event for that order is marked dead without attempting
                // publication, preserving per-order delivery order (spec.md §4.8).
                let mut errored_orders = HashSet::new();
                let mut completed_ids = Vec::new();
                let mut dead_ids = Vec::new();

                for event in &events {
                    if errored_orders.contains(&event.order_id) {
                        dead_ids.push(event.id);
                        continue;
                    }

                    let wire = OrderEvent {
                        order_id: event.order_id,
                        status: event.status.as_str().to_owned(),
                        moment: event.moment,
                    };

                    match producer.publish(&wire).await {
                        Ok(()) => completed_ids.push(event.id),
                        Err(err) => {
                            tracing::warn!(order_id = event.order_id, error = %err, "failed to publish order event");
                            errored_orders.insert(event.order_id);
                            dead_ids.push(event.id);
                        }
                    }
                }

                outbox_repo::update_status_batch(&mut **tx, &completed_ids, EventStatus::Complete)
                    .await?;
                outbox_repo::update_status_batch(&mut **tx, &dead_ids, EventStatus::Dead).await?;

                Ok(())
            })
        })
        .await
    }
}
