use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use storefront_core::ProductId;

use crate::app::services::ProductServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/api/product", get(list_products).post(create_product))
        .route(
            "/api/product/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

fn parse_id(raw: &str) -> Result<ProductId, axum::response::Response> {
    raw.parse().map_err(errors::domain_error_to_response)
}

pub async fn create_product(
    Extension(services): Extension<Arc<ProductServices>>,
    body: Result<Json<dto::ProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::body_rejection_to_response(rejection),
    };

    match services.create(body.into()).await {
        Ok(product) => {
            tracing::info!(product_id = %product.product_id(), "product created");
            (StatusCode::CREATED, Json(dto::ProductResponse::from(&product))).into_response()
        }
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn list_products(Extension(services): Extension<Arc<ProductServices>>) -> axum::response::Response {
    match services.list().await {
        Ok(products) => {
            let items = products.iter().map(dto::ProductResponse::from).collect::<Vec<_>>();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<ProductServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.get(id).await {
        Ok(Some(product)) => (StatusCode::OK, Json(dto::ProductResponse::from(&product))).into_response(),
        Ok(None) => errors::not_found("product not found"),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<ProductServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::ProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::body_rejection_to_response(rejection),
    };

    match services.update(id, body.into()).await {
        Ok(Some(product)) => (StatusCode::OK, Json(dto::ProductResponse::from(&product))).into_response(),
        Ok(None) => errors::not_found("product not found"),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<ProductServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.delete(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => errors::not_found("product not found"),
        Err(e) => errors::repository_error_to_response(e),
    }
}
