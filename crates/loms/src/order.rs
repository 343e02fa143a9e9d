//! Order service and state machine. Grounded on the source's
//! `order_service.go`; the two-phase create protocol and the per-transition
//! outbox write are carried unchanged (spec.md §4.7, §9 Open Questions).

use std::sync::Arc;

use storage::{with_tx, Isolation, PoolManager};

use crate::domain::{Error, Order, OrderItem, OrderStatus};
use crate::repo::{order as order_repo, outbox as outbox_repo, stock as stock_repo};
use crate::stock::StockService;

pub struct OrderService {
    pool: Arc<PoolManager>,
    stock: Arc<StockService>,
}

impl OrderService {
    pub fn new(pool: Arc<PoolManager>, stock: Arc<StockService>) -> Self {
        Self { pool, stock }
    }

    /// Two-step create (spec.md §4.7): (1) insert the order as `new` plus
    /// its `new`-status outbox row, committed; (2) reserve stock outside
    /// that transaction; (3) a second transaction records the terminal
    /// `awaiting_payment`/`failed` status with its own outbox row. The
    /// `order_id` is always returned; a reservation failure is returned
    /// alongside it rather than aborting the whole call, matching the
    /// source (an Open Question resolved in DESIGN.md: this can leak a
    /// `new`-status order on a crash between steps 1 and 3 — the outbox,
    /// not the order row, is the source of truth for observers).
    pub async fn create(&self, user_id: i64, items: Vec<OrderItem>) -> Result<(i64, Result<(), Error>), Error> {
        if items.is_empty() {
            return Err(Error::EmptyOrderItems);
        }

        let insert_items = items.clone();
        let order_id = with_tx(self.pool.writable(), Isolation::Default, |tx| {
            Box::pin(async move {
                let order_id =
                    order_repo::insert(tx, user_id, OrderStatus::New, &insert_items)
                        .await?;
                outbox_repo::insert(&mut **tx, order_id, OrderStatus::New).await?;
                Ok::<_, Error>(order_id)
            })
        })
        .await?;

        // Built from the caller's own data rather than re-read from the
        // database, so this can't race a lagging read replica right after
        // the commit above.
        let order = Order {
            order_id,
            user_id,
            status: OrderStatus::New,
            items,
        };
        let reserve_result = self.stock.reserve_for(&order).await;

        let final_status = if reserve_result.is_ok() {
            OrderStatus::AwaitingPayment
        } else {
            OrderStatus::Failed
        };

        with_tx(self.pool.writable(), Isolation::Default, |tx| {
            Box::pin(async move {
                order_repo::update_status(&mut **tx, order_id, final_status).await?;
                outbox_repo::insert(&mut **tx, order_id, final_status).await?;
                Ok::<_, Error>(())
            })
        })
        .await?;

        Ok((order_id, reserve_result))
    }

    pub async fn get_info(&self, order_id: i64) -> Result<Order, Error> {
        let mut conn = self.pool.readable().acquire().await?;
        order_repo::get_by_id_with_items(&mut conn, order_id)
            .await?
            .ok_or(Error::OrderNotFound(order_id))
    }

    /// No-op if already `paid`; fails if not `awaiting_payment`. The
    /// read-then-decide-then-write is one `REPEATABLE READ` transaction, so
    /// the stock mutation is inlined here rather than delegated to
    /// [`StockService`] (which would open its own, unrelated transaction —
    /// the source's `FromTx` re-entry has no Rust equivalent without this
    /// inlining; see DESIGN.md).
    pub async fn pay(&self, order_id: i64) -> Result<(), Error> {
        with_tx(self.pool.writable(), Isolation::RepeatableRead, |tx| {
            Box::pin(async move {
                let order = order_repo::get_by_id_with_items(tx, order_id)
                    .await?
                    .ok_or(Error::OrderNotFound(order_id))?;

                match order.status {
                    OrderStatus::Paid => return Ok(()),
                    OrderStatus::AwaitingPayment => {}
                    _ => return Err(Error::InvalidStatusForPay),
                }

                for item in &order.items {
                    stock_repo::reduce_total_and_reserve(&mut **tx, item.sku, item.count).await?;
                }

                order_repo::update_status(&mut **tx, order_id, OrderStatus::Paid).await?;
                outbox_repo::insert(&mut **tx, order_id, OrderStatus::Paid).await?;
                Ok(())
            })
        })
        .await
    }

    /// No-op if already `cancelled`; fails if `paid` or `failed`.
    pub async fn cancel(&self, order_id: i64) -> Result<(), Error> {
        with_tx(self.pool.writable(), Isolation::RepeatableRead, |tx| {
            Box::pin(async move {
                let order = order_repo::get_by_id_with_items(tx, order_id)
                    .await?
                    .ok_or(Error::OrderNotFound(order_id))?;

                match order.status {
                    OrderStatus::Cancelled => return Ok(()),
                    OrderStatus::Paid | OrderStatus::Failed => {
                        return Err(Error::InvalidStatusForCancel)
                    }
                    _ => {}
                }

                for item in &order.items {
                    stock_repo::remove_reserve(&mut **tx, item.sku, item.count).await?;
                }

                order_repo::update_status(&mut **tx, order_id, OrderStatus::Cancelled).await?;
                outbox_repo::insert(&mut **tx, order_id, OrderStatus::Cancelled).await?;
                Ok(())
            })
        })
        .await
    }
}
