use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};

use storefront_core::OrderNumber;

use crate::app::services::OrderServices;
use crate::app::{dto, errors};

pub const ORDER_PLACED_MESSAGE: &str = "Order Placed Successfully!";

pub fn router() -> Router {
    Router::new()
        .route("/api/order", post(place_order))
        .route("/api/order/:order_number", get(get_order))
}

pub async fn place_order(
    Extension(services): Extension<Arc<OrderServices>>,
    body: Result<Json<dto::OrderRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::body_rejection_to_response(rejection),
    };

    match services.place_order(body.into()).await {
        Ok(order) => (
            StatusCode::CREATED,
            [(header::LOCATION, format!("/api/order/{}", order.order_number()))],
            ORDER_PLACED_MESSAGE,
        )
            .into_response(),
        Err(e) => errors::placement_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<OrderServices>>,
    Path(order_number): Path<String>,
) -> axum::response::Response {
    let order_number: OrderNumber = match order_number.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.find_order(&order_number).await {
        Ok(Some(order)) => (StatusCode::OK, Json(dto::OrderResponse::from(&order))).into_response(),
        Ok(None) => errors::not_found("order not found"),
        Err(e) => errors::placement_error_to_response(e),
    }
}
