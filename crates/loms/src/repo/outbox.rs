//! Outbox rows: grounded on the source's `order_event_repository.go`
//! (`Insert`/`GetUnprocessedEventsLimit`/`UpdateEventStatus`).

use std::str::FromStr;

use chrono::Utc;
use sqlx::PgExecutor;

use crate::domain::{EventStatus, OrderStatus, OutboxEvent};

/// Writes one `new`-status outbox row. Callers are responsible for doing
/// this inside the same transaction as the order-status change it records
/// (spec.md §3 "exactly one outbox row per transition").
pub async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    order_id: i64,
    status: OrderStatus,
) -> Result<(), sqlx::Error> {
    let status_str = status.as_str();
    let event_status_str = EventStatus::New.as_str();
    sqlx::query!(
        "INSERT INTO outbox_events (order_id, status, moment, event_status)
         VALUES ($1, $2, $3, $4)",
        order_id,
        status_str,
        Utc::now(),
        event_status_str
    )
    .execute(executor)
    .await?;
    Ok(())
}

struct OutboxRow {
    id: i64,
    order_id: i64,
    status: String,
    moment: chrono::DateTime<Utc>,
}

/// `SELECT ... FOR UPDATE SKIP LOCKED` so multiple publisher replicas can
/// poll concurrently without duplicating work within a single tick
/// (ambient hardening noted in SPEC_FULL.md §4.8).
pub async fn get_unprocessed<'e>(
    executor: impl PgExecutor<'e>,
    limit: i64,
) -> Result<Vec<OutboxEvent>, sqlx::Error> {
    let rows = sqlx::query_as!(
        OutboxRow,
        "SELECT id, order_id, status, moment FROM outbox_events
         WHERE event_status = 'new'
         ORDER BY id ASC
         LIMIT $1
         FOR UPDATE SKIP LOCKED",
        limit
    )
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| OutboxEvent {
            id: r.id,
            order_id: r.order_id,
            status: OrderStatus::from_str(&r.status)
                .unwrap_or_else(|e| panic!("corrupt outbox status row: {e}")),
            moment: r.moment,
        })
        .collect())
}

pub async fn update_status_batch<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[i64],
    new_status: EventStatus,
) -> Result<(), sqlx::Error> {
    if ids.is_empty() {
        return Ok(());
    }
    let status_str = new_status.as_str();
    sqlx::query!(
        "UPDATE outbox_events SET event_status = $2 WHERE id = ANY($1)",
        ids,
        status_str
    )
    .execute(executor)
    .await?;
    Ok(())
}
