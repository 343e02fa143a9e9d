//! LOMS gRPC client: stock lookups and order creation. Grounded on the
//! source's `loms_service.go`.

use loms_proto::loms_client::LomsClient as GeneratedLomsClient;
use loms_proto::{OrderCreateRequest, OrderItem, StockInfoRequest};
use tonic::transport::Channel;

use crate::domain::{Cart, Error};

pub struct LomsClient {
    inner: GeneratedLomsClient<Channel>,
}

impl LomsClient {
    pub async fn connect(address: String) -> Result<Self, tonic::transport::Error> {
        let inner = GeneratedLomsClient::connect(address).await?;
        Ok(Self { inner })
    }

    pub async fn stock_info(&self, sku: i64) -> Result<u32, Error> {
        let mut client = self.inner.clone();
        let response = client
            .stock_info(StockInfoRequest { sku })
            .await
            .map_err(Error::from)?;
        Ok(response.into_inner().count)
    }

    pub async fn order_create(&self, user_id: i64, cart: &Cart) -> Result<i64, Error> {
        let mut client = self.inner.clone();
        let items = cart
            .items
            .values()
            .map(|item| OrderItem {
                sku: item.sku,
                count: item.count,
            })
            .collect();
        let response = client
            .order_create(OrderCreateRequest { user_id, items })
            .await
            .map_err(Error::from)?;
        Ok(response.into_inner().order_id)
    }
}
