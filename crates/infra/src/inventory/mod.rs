//! Inventory lookup: the advisory per-SKU stock query made before an order
//! is stored.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use storefront_orders::InventoryResponse;

pub mod http;
pub mod in_memory;

pub use http::HttpInventoryClient;
pub use in_memory::StaticInventory;

/// Inventory service failure. Distinct from "not in stock", which is a
/// successful answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InventoryError {
    /// Connection refused, reset, DNS failure, etc.
    #[error("inventory service unreachable: {0}")]
    Transport(String),

    #[error("inventory service timed out")]
    Timeout,

    /// Non-2xx response.
    #[error("inventory service returned status {0}")]
    Status(u16),

    /// Body was not a JSON array of `{skuCode, isInStock}`.
    #[error("failed to decode inventory response: {0}")]
    Decode(String),
}

/// Stock status for a batch of SKUs in one call.
///
/// Implementations return at most one entry per known SKU; SKUs they know
/// nothing about may simply be absent.
#[async_trait]
pub trait InventoryLookup: Send + Sync {
    async fn check_stock(&self, sku_codes: &[String]) -> Result<Vec<InventoryResponse>, InventoryError>;
}

#[async_trait]
impl<I> InventoryLookup for Arc<I>
where
    I: InventoryLookup + ?Sized,
{
    async fn check_stock(&self, sku_codes: &[String]) -> Result<Vec<InventoryResponse>, InventoryError> {
        (**self).check_stock(sku_codes).await
    }
}
