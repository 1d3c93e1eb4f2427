use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use storefront_core::DomainError;
use storefront_infra::PlacementError;
use storefront_infra::repository::RepositoryError;

pub fn placement_error_to_response(err: PlacementError) -> axum::response::Response {
    match err {
        PlacementError::OutOfStock { .. } => {
            json_error(StatusCode::BAD_REQUEST, "out_of_stock", err.to_string())
        }
        PlacementError::Validation(e) => domain_error_to_response(e),
        PlacementError::Inventory(e) => {
            json_error(StatusCode::BAD_GATEWAY, "inventory_unavailable", e.to_string())
        }
        PlacementError::Repository(e) => repository_error_to_response(e),
        PlacementError::Publish(msg) => json_error(StatusCode::BAD_GATEWAY, "publish_error", msg),
    }
}

pub fn repository_error_to_response(err: RepositoryError) -> axum::response::Response {
    match err {
        RepositoryError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        other => json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", other.to_string()),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
    }
}

/// Malformed or mistyped JSON bodies are client errors.
pub fn body_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text())
}

pub fn not_found(message: impl Into<String>) -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "not_found", message)
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
