//! Product-service HTTP client: rate-limited, retrying lookups by SKU.
//! Grounded on the source's `product_service.go`.

use std::sync::Arc;

use httpclient::{RetryingClient, TokenBucket};
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;

use crate::domain::{Error, Product};

#[derive(Debug, Deserialize)]
struct ProductResponse {
    name: String,
    price: u32,
    sku: i64,
}

#[derive(Clone)]
pub struct ProductClient {
    client: RetryingClient,
    limiter: Arc<TokenBucket>,
    base_url: Url,
    token: String,
}

impl ProductClient {
    pub fn new(
        client: RetryingClient,
        limiter: Arc<TokenBucket>,
        base_url: Url,
        token: String,
    ) -> Self {
        Self {
            client,
            limiter,
            base_url,
            token,
        }
    }

    pub async fn get_product_by_sku(&self, sku: i64) -> Result<Product, Error> {
        self.limiter.acquire().await;

        let url = self
            .base_url
            .join(&format!("product/{sku}"))
            .expect("base_url is a valid base");

        let response = self
            .client
            .execute_with_headers(Method::GET, url, &[("X-API-KEY", &self.token)])
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body: ProductResponse = response
                    .json()
                    .await
                    .map_err(httpclient::RetryError::from)?;
                Ok(Product {
                    sku: body.sku,
                    name: body.name,
                    price: body.price,
                })
            }
            StatusCode::NOT_FOUND => Err(Error::ProductNotFound),
            status => Err(Error::UpstreamStatus(status.as_u16())),
        }
    }
}
