//! Integration tests against a live Postgres database, gated by `#[sqlx::test]`
//! (creates and migrates a fresh database per test). Grounded on spec.md §8's
//! concrete scenarios (S1-S3, P1) and round-trip laws.

use std::sync::Arc;

use loms::domain::{Error, OrderItem, OrderStatus, Stock};
use loms::order::OrderService;
use loms::stock::StockService;
use sqlx::PgPool;
use storage::PoolManager;

fn services(pool: PgPool) -> (Arc<StockService>, Arc<OrderService>) {
    let pool = Arc::new(PoolManager::new(pool, vec![]));
    let stock = Arc::new(StockService::new(pool.clone()));
    let order = Arc::new(OrderService::new(pool, stock.clone()));
    (stock, order)
}

/// S1: reserve then pay drains `reserved` back into `total_count`.
#[sqlx::test]
async fn reserve_then_pay_reduces_total_and_reserved(pool: PgPool) {
    let (stock, order) = services(pool);
    stock
        .create(Stock {
            sku: 100,
            total_count: 10,
            reserved: 0,
        })
        .await
        .unwrap();

    let (order_id, reserve_result) = order
        .create(1, vec![OrderItem { sku: 100, count: 3 }])
        .await
        .unwrap();
    reserve_result.unwrap();

    let info = order.get_info(order_id).await.unwrap();
    assert_eq!(info.status, OrderStatus::AwaitingPayment);
    assert_eq!(stock.get_available_count(100).await.unwrap(), 7);

    order.pay(order_id).await.unwrap();
    let available = stock.get_available_count(100).await.unwrap();
    assert_eq!(available, 7);

    // Pay of an already-paid order is a no-op success (idempotence law).
    order.pay(order_id).await.unwrap();
}

/// S2: an order that can't be reserved still gets an id, but lands `failed`
/// and leaves stock untouched.
#[sqlx::test]
async fn out_of_stock_order_fails_without_mutating_stock(pool: PgPool) {
    let (stock, order) = services(pool);
    stock
        .create(Stock {
            sku: 200,
            total_count: 1,
            reserved: 0,
        })
        .await
        .unwrap();

    let (order_id, reserve_result) = order
        .create(1, vec![OrderItem { sku: 200, count: 5 }])
        .await
        .unwrap();
    assert!(matches!(reserve_result, Err(Error::CannotReserve)));

    let info = order.get_info(order_id).await.unwrap();
    assert_eq!(info.status, OrderStatus::Failed);
    assert_eq!(stock.get_available_count(200).await.unwrap(), 1);
}

/// S3: cancelling an `awaiting_payment` order restores availability.
#[sqlx::test]
async fn cancel_restores_availability(pool: PgPool) {
    let (stock, order) = services(pool);
    stock
        .create(Stock {
            sku: 300,
            total_count: 5,
            reserved: 0,
        })
        .await
        .unwrap();

    let (order_id, reserve_result) = order
        .create(1, vec![OrderItem { sku: 300, count: 2 }])
        .await
        .unwrap();
    reserve_result.unwrap();
    assert_eq!(stock.get_available_count(300).await.unwrap(), 3);

    order.cancel(order_id).await.unwrap();
    let info = order.get_info(order_id).await.unwrap();
    assert_eq!(info.status, OrderStatus::Cancelled);
    assert_eq!(stock.get_available_count(300).await.unwrap(), 5);

    // Cancel of a cancelled order is a no-op success.
    order.cancel(order_id).await.unwrap();
}

/// Seeding a stock twice is additive (round-trip law).
#[sqlx::test]
async fn seeding_stock_twice_sums_counts(pool: PgPool) {
    let (stock, _order) = services(pool);
    stock
        .create(Stock {
            sku: 400,
            total_count: 10,
            reserved: 2,
        })
        .await
        .unwrap();
    stock
        .create(Stock {
            sku: 400,
            total_count: 10,
            reserved: 2,
        })
        .await
        .unwrap();

    assert_eq!(stock.get_available_count(400).await.unwrap(), 16);
}

/// Exercises `StockService`'s reservation primitives directly (spec.md
/// §4.6), independent of the order state machine.
#[sqlx::test]
async fn stock_service_reserve_cancel_confirm_round_trip(pool: PgPool) {
    let (stock, _order) = services(pool);
    stock
        .create(Stock {
            sku: 500,
            total_count: 20,
            reserved: 0,
        })
        .await
        .unwrap();

    let order = loms::domain::Order {
        order_id: 1,
        user_id: 1,
        status: OrderStatus::New,
        items: vec![OrderItem { sku: 500, count: 4 }],
    };

    stock.reserve_for(&order).await.unwrap();
    assert_eq!(stock.get_available_count(500).await.unwrap(), 16);

    stock.cancel_reserve_for(&order).await.unwrap();
    assert_eq!(stock.get_available_count(500).await.unwrap(), 20);

    stock.reserve_for(&order).await.unwrap();
    stock.confirm_reserve_for(&order).await.unwrap();
    // total_count and reserved both drop by 4: 20-4=16 total, 0 reserved.
    assert_eq!(stock.get_available_count(500).await.unwrap(), 16);

    // Cancelling an already-unreserved order saturates at zero rather than
    // erroring or going negative.
    stock.cancel_reserve_for(&order).await.unwrap();
    assert_eq!(stock.get_available_count(500).await.unwrap(), 16);
}

/// P1: 50 of 100 parallel reservations against a stock of 50 succeed; the
/// other 50 fail, and none of them corrupt `available`.
#[sqlx::test]
async fn concurrent_reservations_never_oversell(pool: PgPool) {
    let pool = Arc::new(PoolManager::new(pool, vec![]));
    let stock = Arc::new(StockService::new(pool.clone()));
    let order_service = Arc::new(OrderService::new(pool, stock.clone()));

    stock
        .create(Stock {
            sku: 600,
            total_count: 50,
            reserved: 0,
        })
        .await
        .unwrap();

    let mut tasks = Vec::with_capacity(100);
    for _ in 0..100 {
        let order_service = order_service.clone();
        tasks.push(tokio::spawn(async move {
            order_service
                .create(1, vec![OrderItem { sku: 600, count: 1 }])
                .await
                .unwrap()
                .1
                .is_ok()
        }));
    }

    let mut succeeded = 0;
    for task in tasks {
        if task.await.unwrap() {
            succeeded += 1;
        }
    }

    assert_eq!(succeeded, 50);
    assert_eq!(stock.get_available_count(600).await.unwrap(), 0);
}
