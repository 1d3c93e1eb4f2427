//! HTTP client for the inventory service.
//!
//! `GET {base}/api/inventory?skuCode=a&skuCode=b` → `[{"skuCode":"a","isInStock":true}, ...]`

use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use storefront_orders::InventoryResponse;

use super::{InventoryError, InventoryLookup};

/// Inventory client holding one pooled `reqwest::Client` for the life of the
/// process.
#[derive(Debug, Clone)]
pub struct HttpInventoryClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpInventoryClient {
    /// `timeout` of `None` means requests wait for the server indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, InventoryError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| InventoryError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/inventory", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl InventoryLookup for HttpInventoryClient {
    #[instrument(skip_all, fields(endpoint = %self.endpoint, sku_count = sku_codes.len()), err)]
    async fn check_stock(&self, sku_codes: &[String]) -> Result<Vec<InventoryResponse>, InventoryError> {
        let query: Vec<(&str, &str)> = sku_codes.iter().map(|s| ("skuCode", s.as_str())).collect();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&query)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(InventoryError::Status(status.as_u16()));
        }

        response
            .json::<Vec<InventoryResponse>>()
            .await
            .map_err(|e| if e.is_timeout() { InventoryError::Timeout } else { InventoryError::Decode(e.to_string()) })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> InventoryError {
    if err.is_timeout() {
        InventoryError::Timeout
    } else {
        InventoryError::Transport(err.to_string())
    }
}
