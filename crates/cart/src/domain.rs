//! Cart entities and error kinds. Grounded on the source's
//! `domain/cart_item.go` and `domain/errors.go`.

use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct CartItem {
    pub sku: i64,
    pub name: String,
    pub price: u32,
    pub count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Cart {
    pub items: BTreeMap<i64, CartItem>,
}

impl Cart {
    pub fn total_price(&self) -> u32 {
        self.items
            .values()
            .map(|item| item.price * item.count)
            .sum()
    }
}

#[derive(Debug, Clone)]
pub struct Product {
    pub sku: i64,
    pub name: String,
    pub price: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cart is empty")]
    CartEmpty,
    #[error("SKU does not exist")]
    ProductNotFound,
    #[error("requested count exceeds available stock")]
    OutOfStock,
    #[error("user_id must be a positive integer")]
    InvalidUserId,
    #[error("sku must be a positive integer")]
    InvalidSku,
    #[error("count must be a positive integer")]
    InvalidCount,
    #[error("product service error")]
    Product(#[from] httpclient::RetryError),
    #[error("downstream response status {0}")]
    UpstreamStatus(u16),
    #[error("downstream gRPC error")]
    Grpc(#[from] tonic::Status),
}
