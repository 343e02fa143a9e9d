//! Order + order-item rows: grounded on the source's `order_repository.go`
//! (`Insert`/`GetByIDOrderItemsBySKU`/`UpdateStatus`).

use std::str::FromStr;

use sqlx::{PgConnection, PgExecutor};

use crate::domain::{Order, OrderItem, OrderStatus};

/// Takes `&mut PgConnection` (rather than a generic executor) because it
/// issues several statements that must all land on the same connection —
/// callers reborrow with `&mut *tx` (sqlx transactions deref to
/// `PgConnection`) or `&mut *conn.acquire().await?`.
pub async fn insert(
    conn: &mut PgConnection,
    user_id: i64,
    status: OrderStatus,
    items: &[OrderItem],
) -> Result<i64, sqlx::Error> {
    let status_str = status.as_str();
    let order_id = sqlx::query_scalar!(
        "INSERT INTO orders (user_id, status) VALUES ($1, $2) RETURNING order_id",
        user_id,
        status_str
    )
    .fetch_one(&mut *conn)
    .await?;

    for item in items {
        sqlx::query!(
            "INSERT INTO order_items (order_id, sku, count) VALUES ($1, $2, $3)",
            order_id,
            item.sku,
            item.count as i64
        )
        .execute(&mut *conn)
        .await?;
    }

    Ok(order_id)
}

struct OrderRow {
    order_id: i64,
    user_id: i64,
    status: String,
}

struct OrderItemRow {
    sku: i64,
    count: i64,
}

/// Returns the order with its items ordered by SKU ascending, or `None` if
/// no such order exists.
pub async fn get_by_id_with_items(
    conn: &mut PgConnection,
    order_id: i64,
) -> Result<Option<Order>, sqlx::Error> {
    let order_row = sqlx::query_as!(
        OrderRow,
        "SELECT order_id, user_id, status FROM orders WHERE order_id = $1",
        order_id
    )
    .fetch_optional(&mut *conn)
    .await?;

    let Some(order_row) = order_row else {
        return Ok(None);
    };

    let item_rows = sqlx::query_as!(
        OrderItemRow,
        "SELECT sku, count FROM order_items WHERE order_id = $1 ORDER BY sku ASC",
        order_id
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(Order {
        order_id: order_row.order_id,
        user_id: order_row.user_id,
        status: OrderStatus::from_str(&order_row.status)
            .unwrap_or_else(|e| panic!("corrupt order status row: {e}")),
        items: item_rows
            .into_iter()
            .map(|r| OrderItem {
                sku: r.sku,
                count: r.count as u32,
            })
            .collect(),
    }))
}

pub async fn update_status<'e>(
    executor: impl PgExecutor<'e>,
    order_id: i64,
    status: OrderStatus,
) -> Result<(), sqlx::Error> {
    let status_str = status.as_str();
    sqlx::query!(
        "UPDATE orders SET status = $2 WHERE order_id = $1",
        order_id,
        status_str
    )
    .execute(executor)
    .await?;
    Ok(())
}
