//! Stock service: reservation, cancellation, and confirmed-consumption of
//! per-SKU stock. Grounded on the source's `stock_service.go`.

use std::sync::Arc;

use storage::{with_tx, Isolation, PoolManager};

use crate::domain::{Error, Order, Stock};
use crate::repo::stock as repo;

pub struct StockService {
    pool: Arc<PoolManager>,
}

impl StockService {
    pub fn new(pool: Arc<PoolManager>) -> Self {
        Self { pool }
    }

    /// Upserts a stock row, *adding* to existing counts (spec.md §9).
    /// Fails validation before touching the database if the caller's own
    /// row would already violate `reserved <= total_count`.
    pub async fn create(&self, stock: Stock) -> Result<(), Error> {
        if stock.reserved > stock.total_count {
            return Err(Error::InvalidStock);
        }
        repo::upsert(self.pool.writable(), stock).await?;
        Ok(())
    }

    pub async fn get_available_count(&self, sku: i64) -> Result<u32, Error> {
        let stock = repo::get_by_sku(self.pool.readable(), sku)
            .await?
            .ok_or(Error::StockNotFound(sku))?;
        Ok(stock.available())
    }

    /// For each item in `order`, locks the stock row, checks availability,
    /// and increments `reserved`. Any failure aborts the whole transaction
    /// so no partial reservation is left behind.
    ///
    /// Runs at the default (read-committed) isolation level rather than
    /// repeatable-read: `SELECT ... FOR UPDATE` already serializes
    /// concurrent reservations against the same row by blocking until the
    /// lock holder commits. Under repeatable-read, that blocked waiter
    /// would instead surface a serialization-failure error as soon as it
    /// acquires the lock and notices the row changed under it, turning
    /// legitimate concurrent reservations on the same sku into spurious
    /// failures.
    pub async fn reserve_for(&self, order: &Order) -> Result<(), Error> {
        let items = order.items.clone();
        with_tx(
            self.pool.writable(),
            Isolation::Default,
            |tx| {
                Box::pin(async move {
                    for item in &items {
                        let stock = repo::get_by_sku_for_update(&mut **tx, item.sku)
                            .await?
                            .ok_or(Error::StockNotFound(item.sku))?;

                        if stock.available() < item.count {
                            return Err(Error::CannotReserve);
                        }

                        repo::add_reserve(&mut **tx, item.sku, item.count).await?;
                    }
                    Ok(())
                })
            },
        )
        .await
    }

    /// Decrements `reserved` for each item; saturates at zero at the
    /// repository level, so cancelling an already-cancelled order is safe.
    pub async fn cancel_reserve_for(&self, order: &Order) -> Result<(), Error> {
        let items = order.items.clone();
        with_tx(self.pool.writable(), Isolation::Default, |tx| {
            Box::pin(async move {
                for item in &items {
                    repo::remove_reserve(&mut **tx, item.sku, item.count).await?;
                }
                Ok(())
            })
        })
        .await
    }

    /// Decrements both `total_count` and `reserved` for each item.
    pub async fn confirm_reserve_for(&self, order: &Order) -> Result<(), Error> {
        let items = order.items.clone();
        with_tx(self.pool.writable(), Isolation::Default, |tx| {
            Box::pin(async move {
                for item in &items {
                    repo::reduce_total_and_reserve(&mut **tx, item.sku, item.count).await?;
                }
                Ok(())
            })
        })
        .await
    }
}
