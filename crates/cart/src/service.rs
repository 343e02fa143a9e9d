//! Cart service: composes the in-memory store with the product and LOMS
//! clients. Grounded on the source's `cart_service.go`.

use tokio::task::JoinSet;

use crate::domain::{Cart, CartItem, Error};
use crate::loms_client::LomsClient;
use crate::product_client::ProductClient;
use crate::store::CartStore;

pub struct CartService {
    store: CartStore,
    product_client: ProductClient,
    loms_client: LomsClient,
}

impl CartService {
    pub fn new(store: CartStore, product_client: ProductClient, loms_client: LomsClient) -> Self {
        Self {
            store,
            product_client,
            loms_client,
        }
    }

    pub async fn add_cart_item(
        &self,
        user_id: i64,
        sku: i64,
        count: u32,
    ) -> Result<CartItem, Error> {
        let product = self.product_client.get_product_by_sku(sku).await?;
        let available = self.loms_client.stock_info(sku).await?;
        if available < count {
            return Err(Error::OutOfStock);
        }

        Ok(self
            .store
            .upsert_item(
                user_id,
                CartItem {
                    sku: product.sku,
                    name: product.name,
                    price: product.price,
                    count,
                },
            )
            .await)
    }

    pub async fn delete_cart_item(&self, user_id: i64, sku: i64) {
        self.store.delete_item(user_id, sku).await;
    }

    pub async fn clear_cart(&self, user_id: i64) {
        self.store.delete_cart(user_id).await;
    }

    /// Concurrently hydrates every item's name/price from the product
    /// service; the first failure cancels the remaining lookups.
    pub async fn get_cart(&self, user_id: i64) -> Result<Cart, Error> {
        let snapshot = self.store.get(user_id).await;
        if snapshot.items.is_empty() {
            return Ok(snapshot);
        }

        let mut tasks = JoinSet::new();
        for item in snapshot.items.into_values() {
            let product_client = self.product_client.clone();
            tasks.spawn(async move { hydrate(&product_client, item).await });
        }

        let mut hydrated = Cart::default();
        while let Some(result) = tasks.join_next().await {
            match result.expect("hydration task panicked") {
                Ok(item) => {
                    hydrated.items.insert(item.sku, item);
                }
                Err(err) => {
                    tasks.abort_all();
                    return Err(err);
                }
            }
        }

        Ok(hydrated)
    }

    /// Current number of carts held, for the repo-size observer.
    pub async fn cart_count(&self) -> usize {
        self.store.count_objects().await
    }

    pub async fn checkout(&self, user_id: i64) -> Result<i64, Error> {
        let cart = self.store.get(user_id).await;
        if cart.items.is_empty() {
            return Err(Error::CartEmpty);
        }

        let order_id = self.loms_client.order_create(user_id, &cart).await?;
        self.store.delete_cart(user_id).await;
        Ok(order_id)
    }
}

async fn hydrate(product_client: &ProductClient, item: CartItem) -> Result<CartItem, Error> {
    let product = product_client.get_product_by_sku(item.sku).await?;
    Ok(CartItem {
        sku: product.sku,
        name: product.name,
        price: product.price,
        count: item.count,
    })
}
