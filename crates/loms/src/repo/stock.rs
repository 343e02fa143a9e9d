//! Stock rows: grounded on the source's `stock_repository.go`
//! (`Upsert`/`Reserve`/`RemoveReserve`/`ReduceTotalAndReserve`/`GetBySkuID`).

use sqlx::PgExecutor;

use crate::domain::Stock;

struct StockRow {
    sku: i64,
    total_count: i64,
    reserved: i64,
}

impl From<StockRow> for Stock {
    fn from(row: StockRow) -> Self {
        Stock {
            sku: row.sku,
            total_count: row.total_count as u32,
            reserved: row.reserved as u32,
        }
    }
}

/// Upsert that *adds* to existing counts (spec.md §4.6, §9 "Upsert adds").
pub async fn upsert<'e>(executor: impl PgExecutor<'e>, stock: Stock) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO stocks (sku, total_count, reserved) VALUES ($1, $2, $3)
         ON CONFLICT (sku) DO UPDATE
         SET total_count = stocks.total_count + EXCLUDED.total_count,
             reserved = stocks.reserved + EXCLUDED.reserved",
    )
    .bind(stock.sku)
    .bind(stock.total_count as i64)
    .bind(stock.reserved as i64)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get_by_sku<'e>(
    executor: impl PgExecutor<'e>,
    sku: i64,
) -> Result<Option<Stock>, sqlx::Error> {
    let row = sqlx::query_as!(
        StockRow,
        "SELECT sku, total_count, reserved FROM stocks WHERE sku = $1",
        sku
    )
    .fetch_optional(executor)
    .await?;
    Ok(row.map(Stock::from))
}

/// Locks the row for the duration of the caller's transaction
/// (`SELECT ... FOR UPDATE`), matching the source's reserve-time read.
pub async fn get_by_sku_for_update<'e>(
    executor: impl PgExecutor<'e>,
    sku: i64,
) -> Result<Option<Stock>, sqlx::Error> {
    let row = sqlx::query_as!(
        StockRow,
        "SELECT sku, total_count, reserved FROM stocks WHERE sku = $1 FOR UPDATE",
        sku
    )
    .fetch_optional(executor)
    .await?;
    Ok(row.map(Stock::from))
}

pub async fn add_reserve<'e>(
    executor: impl PgExecutor<'e>,
    sku: i64,
    delta: u32,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE stocks SET reserved = reserved + $2 WHERE sku = $1")
        .bind(sku)
        .bind(delta as i64)
        .execute(executor)
        .await?;
    Ok(())
}

/// Saturates at zero so cancelling an already-cancelled order's reserve is
/// idempotent (spec.md §4.6).
pub async fn remove_reserve<'e>(
    executor: impl PgExecutor<'e>,
    sku: i64,
    delta: u32,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE stocks SET reserved = GREATEST(reserved - $2, 0) WHERE sku = $1")
        .bind(sku)
        .bind(delta as i64)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn reduce_total_and_reserve<'e>(
    executor: impl PgExecutor<'e>,
    sku: i64,
    delta: u32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE stocks
         SET total_count = GREATEST(total_count - $2, 0),
             reserved = GREATEST(reserved - $2, 0)
         WHERE sku = $1",
    )
    .bind(sku)
    .bind(delta as i64)
    .execute(executor)
    .await?;
    Ok(())
}
