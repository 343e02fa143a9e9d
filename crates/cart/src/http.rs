//! HTTP gateway: axum routes and handlers for the cart API. Grounded on
//! the teacher's `control::error::AppError` response shape and the
//! source's `handler/*.go` status-code mapping
//! (`add_product_to_cart_handler.go`, `get_cart_handler.go`,
//! `checkout_cart_handler.go`, `request_validator.go`).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::domain::Error;
use crate::service::CartService;

pub fn router(service: Arc<CartService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/user/:user_id/cart/:sku_id", post(add_item))
        .route("/user/:user_id/cart/:sku_id", delete(delete_item))
        .route("/user/:user_id/cart", delete(clear_cart))
        .route("/user/:user_id/cart", get(get_cart))
        .route("/checkout/:user_id", post(checkout))
        .with_state(service)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
struct ErrorWrapper {
    error: ProblemDetails,
}

#[derive(Debug, Serialize)]
struct ProblemDetails {
    title: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::InvalidUserId | Error::InvalidSku | Error::InvalidCount => {
                axum::http::StatusCode::BAD_REQUEST
            }
            Error::CartEmpty => axum::http::StatusCode::NOT_FOUND,
            Error::ProductNotFound | Error::OutOfStock => axum::http::StatusCode::PRECONDITION_FAILED,
            Error::Product(_) | Error::Grpc(_) | Error::UpstreamStatus(_) => {
                axum::http::StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!(message = %self, "cart request failed");
        }

        let body = Json(ErrorWrapper {
            error: ProblemDetails {
                title: self.to_string(),
            },
        });
        (status, body).into_response()
    }
}

fn parse_positive(raw: &str, err: Error) -> Result<i64, Error> {
    raw.parse::<i64>().ok().filter(|v| *v > 0).ok_or(err)
}

#[derive(Debug, Deserialize)]
struct AddItemRequest {
    count: u32,
}

#[derive(Debug, Serialize)]
struct CartItemResponse {
    sku: i64,
    name: String,
    price: u32,
    count: u32,
}

async fn add_item(
    State(service): State<Arc<CartService>>,
    Path((user_id, sku_id)): Path<(String, String)>,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<CartItemResponse>, Error> {
    let user_id = parse_positive(&user_id, Error::InvalidUserId)?;
    let sku = parse_positive(&sku_id, Error::InvalidSku)?;
    if body.count == 0 {
        return Err(Error::InvalidCount);
    }

    let item = service.add_cart_item(user_id, sku, body.count).await?;
    Ok(Json(CartItemResponse {
        sku: item.sku,
        name: item.name,
        price: item.price,
        count: item.count,
    }))
}

async fn delete_item(
    State(service): State<Arc<CartService>>,
    Path((user_id, sku_id)): Path<(String, String)>,
) -> Result<axum::http::StatusCode, Error> {
    let user_id = parse_positive(&user_id, Error::InvalidUserId)?;
    let sku = parse_positive(&sku_id, Error::InvalidSku)?;
    service.delete_cart_item(user_id, sku).await;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

async fn clear_cart(
    State(service): State<Arc<CartService>>,
    Path(user_id): Path<String>,
) -> Result<axum::http::StatusCode, Error> {
    let user_id = parse_positive(&user_id, Error::InvalidUserId)?;
    service.clear_cart(user_id).await;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
struct GetCartResponse {
    items: Vec<CartItemResponse>,
    total_price: u32,
}

async fn get_cart(
    State(service): State<Arc<CartService>>,
    Path(user_id): Path<String>,
) -> Result<Json<GetCartResponse>, Error> {
    let user_id = parse_positive(&user_id, Error::InvalidUserId)?;
    let cart = service.get_cart(user_id).await?;
    if cart.items.is_empty() {
        return Err(Error::CartEmpty);
    }

    let total_price = cart.total_price();
    let items = cart
        .items
        .into_values()
        .map(|item| CartItemResponse {
            sku: item.sku,
            name: item.name,
            price: item.price,
            count: item.count,
        })
        .collect();

    Ok(Json(GetCartResponse { items, total_price }))
}

#[derive(Debug, Serialize)]
struct CheckoutResponse {
    order_id: i64,
}

async fn checkout(
    State(service): State<Arc<CartService>>,
    Path(user_id): Path<String>,
) -> Result<Json<CheckoutResponse>, Error> {
    let user_id = parse_positive(&user_id, Error::InvalidUserId)?;
    let order_id = service.checkout(user_id).await?;
    Ok(Json(CheckoutResponse { order_id }))
}
