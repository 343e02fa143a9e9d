//! In-memory per-user cart store. Grounded on the source's
//! `cart_repository_in_memory.go` (`sync.RWMutex`-guarded map), generalized
//! to `tokio::sync::RwLock` since every caller here is already async.

use std::collections::{BTreeMap, HashMap};

use tokio::sync::RwLock;

use crate::domain::{Cart, CartItem};

#[derive(Default)]
pub struct CartStore {
    carts: RwLock<HashMap<i64, Cart>>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// If the cart is absent, creates it; if the SKU is present, adds
    /// `item.count` to the existing count; otherwise inserts the item.
    /// Returns the resulting item.
    pub async fn upsert_item(&self, user_id: i64, item: CartItem) -> CartItem {
        let mut carts = self.carts.write().await;
        let cart = carts.entry(user_id).or_default();

        let entry = cart.items.entry(item.sku).or_insert_with(|| CartItem {
            sku: item.sku,
            name: item.name.clone(),
            price: item.price,
            count: 0,
        });
        entry.count += item.count;
        entry.name = item.name;
        entry.price = item.price;
        entry.clone()
    }

    /// Idempotent: absence of the cart or the SKU is not an error.
    pub async fn delete_item(&self, user_id: i64, sku: i64) {
        let mut carts = self.carts.write().await;
        if let Some(cart) = carts.get_mut(&user_id) {
            cart.items.remove(&sku);
        }
    }

    /// Idempotent.
    pub async fn delete_cart(&self, user_id: i64) {
        self.carts.write().await.remove(&user_id);
    }

    /// A deep copy of the user's items, ordered by SKU ascending; an
    /// absent cart yields an empty one.
    pub async fn get(&self, user_id: i64) -> Cart {
        let carts = self.carts.read().await;
        match carts.get(&user_id) {
            Some(cart) => Cart {
                items: BTreeMap::clone(&cart.items),
            },
            None => Cart::default(),
        }
    }

    /// Current number of carts, for the repo-size gauge.
    pub async fn count_objects(&self) -> usize {
        self.carts.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(sku: i64, count: u32) -> CartItem {
        CartItem {
            sku,
            name: "widget".to_string(),
            price: 100,
            count,
        }
    }

    #[tokio::test]
    async fn upsert_adds_to_existing_count() {
        let store = CartStore::new();
        store.upsert_item(1, item(10, 2)).await;
        let result = store.upsert_item(1, item(10, 3)).await;
        assert_eq!(result.count, 5);
    }

    #[tokio::test]
    async fn get_sorts_by_sku_and_empty_cart_has_no_items() {
        let store = CartStore::new();
        store.upsert_item(1, item(20, 1)).await;
        store.upsert_item(1, item(10, 1)).await;

        let cart = store.get(1).await;
        let skus: Vec<i64> = cart.items.keys().copied().collect();
        assert_eq!(skus, vec![10, 20]);

        let empty = store.get(2).await;
        assert!(empty.items.is_empty());
    }

    #[tokio::test]
    async fn delete_item_is_idempotent() {
        let store = CartStore::new();
        store.delete_item(1, 10).await;
        store.upsert_item(1, item(10, 1)).await;
        store.delete_item(1, 10).await;
        store.delete_item(1, 10).await;
        assert!(store.get(1).await.items.is_empty());
    }

    #[tokio::test]
    async fn count_objects_reflects_distinct_users() {
        let store = CartStore::new();
        store.upsert_item(1, item(10, 1)).await;
        store.upsert_item(2, item(10, 1)).await;
        assert_eq!(store.count_objects().await, 2);
    }
}
