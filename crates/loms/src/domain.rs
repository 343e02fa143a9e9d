//! Order/stock/outbox types shared by the repository and service layers.

use chrono::{DateTime, Utc};

/// Finite order-status machine (spec.md §4.7). Terminal states admit only
/// self-loops; enforced by the service layer, not this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    New,
    AwaitingPayment,
    Failed,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::AwaitingPayment => "awaiting_payment",
            OrderStatus::Failed => "failed",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Failed | OrderStatus::Paid | OrderStatus::Cancelled
        )
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(OrderStatus::New),
            "awaiting_payment" => Ok(OrderStatus::AwaitingPayment),
            "failed" => Ok(OrderStatus::Failed),
            "paid" => Ok(OrderStatus::Paid),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status {other:?}")),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderItem {
    pub sku: i64,
    pub count: u32,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub order_id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stock {
    pub sku: i64,
    pub total_count: u32,
    pub reserved: u32,
}

impl Stock {
    pub fn available(self) -> u32 {
        self.total_count - self.reserved
    }
}

/// An outbox row's processing state (distinct from the order status it
/// carries a snapshot of).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    New,
    Complete,
    Dead,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::New => "new",
            EventStatus::Complete => "complete",
            EventStatus::Dead => "dead",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutboxEvent {
    pub id: i64,
    pub order_id: i64,
    pub status: OrderStatus,
    pub moment: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("order {0} does not exist")]
    OrderNotFound(i64),
    #[error("stock for sku {0} does not exist")]
    StockNotFound(i64),
    #[error("stock data is invalid: reserved exceeds total_count")]
    InvalidStock,
    #[error("order items list must not be empty")]
    EmptyOrderItems,
    #[error("not enough stock to reserve")]
    CannotReserve,
    #[error("cannot pay for an order in its current status")]
    InvalidStatusForPay,
    #[error("cannot cancel an order that is paid or failed")]
    InvalidStatusForCancel,
    #[error("database error")]
    Db(#[from] sqlx::Error),
}
