//! gRPC front: maps [`OrderService`]/[`StockService`] onto the generated
//! `loms_proto` stubs, with error-kind-to-`tonic::Status` mapping per
//! spec.md §6/§7 (out of scope: the wire framing itself, owned by `tonic`).

use std::sync::Arc;

use loms_proto::loms_server::Loms;
use loms_proto::{
    OrderCancelRequest, OrderCancelResponse, OrderCreateRequest, OrderCreateResponse,
    OrderInfoRequest, OrderInfoResponse, OrderItem as WireOrderItem, OrderPayRequest,
    OrderPayResponse, StockInfoRequest, StockInfoResponse,
};
use tonic::{Request, Response, Status};

use crate::domain::{Error, OrderItem};
use crate::order::OrderService;
use crate::stock::StockService;

pub struct LomsGrpc {
    pub order: Arc<OrderService>,
    pub stock: Arc<StockService>,
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::OrderNotFound(_) | Error::StockNotFound(_) => Status::not_found(err.to_string()),
            Error::InvalidStock | Error::EmptyOrderItems => {
                Status::invalid_argument(err.to_string())
            }
            Error::CannotReserve | Error::InvalidStatusForPay | Error::InvalidStatusForCancel => {
                Status::failed_precondition(err.to_string())
            }
            Error::Db(_) => Status::internal(err.to_string()),
        }
    }
}

#[tonic::async_trait]
impl Loms for LomsGrpc {
    async fn order_create(
        &self,
        request: Request<OrderCreateRequest>,
    ) -> Result<Response<OrderCreateResponse>, Status> {
        let req = request.into_inner();
        let items: Vec<OrderItem> = req
            .items
            .into_iter()
            .map(|i| OrderItem {
                sku: i.sku,
                count: i.count,
            })
            .collect();

        let (order_id, reserve_result) = self.order.create(req.user_id, items).await?;
        // The reservation error, if any, is already observable via the
        // order's terminal `failed` status and the outbox; `OrderCreate`
        // itself still reports success once the order row exists (spec.md
        // §4.7 "the order_id is always returned").
        if let Err(err) = reserve_result {
            tracing::info!(order_id, error = %err, "order created but reservation failed");
        }

        Ok(Response::new(OrderCreateResponse { order_id }))
    }

    async fn order_info(
        &self,
        request: Request<OrderInfoRequest>,
    ) -> Result<Response<OrderInfoResponse>, Status> {
        let order_id = request.into_inner().order_id;
        let order = self.order.get_info(order_id).await?;

        Ok(Response::new(OrderInfoResponse {
            user_id: order.user_id,
            status: order.status.as_str().to_owned(),
            items: order
                .items
                .into_iter()
                .map(|i| WireOrderItem {
                    sku: i.sku,
                    count: i.count,
                })
                .collect(),
        }))
    }

    async fn order_pay(
        &self,
        request: Request<OrderPayRequest>,
    ) -> Result<Response<OrderPayResponse>, Status> {
        self.order.pay(request.into_inner().order_id).await?;
        Ok(Response::new(OrderPayResponse {}))
    }

    async fn order_cancel(
        &self,
        request: Request<OrderCancelRequest>,
    ) -> Result<Response<OrderCancelResponse>, Status> {
        self.order.cancel(request.into_inner().order_id).await?;
        Ok(Response::new(OrderCancelResponse {}))
    }

    async fn stock_info(
        &self,
        request: Request<StockInfoRequest>,
    ) -> Result<Response<StockInfoResponse>, Status> {
        let count = self.stock.get_available_count(request.into_inner().sku).await?;
        Ok(Response::new(StockInfoResponse { count }))
    }
}
