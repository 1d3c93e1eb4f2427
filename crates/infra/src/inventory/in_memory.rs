//! Fixed stock table for tests/dev.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use storefront_orders::InventoryResponse;

use super::{InventoryError, InventoryLookup};

/// In-memory inventory.
///
/// Answers only for SKUs it has been told about, so a request for an unknown
/// SKU yields a response shorter than the request.
#[derive(Debug, Default)]
pub struct StaticInventory {
    stock: RwLock<HashMap<String, bool>>,
    failure: RwLock<Option<InventoryError>>,
    calls: AtomicUsize,
}

impl StaticInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stock(self, sku_code: impl Into<String>, in_stock: bool) -> Self {
        self.set_stock(sku_code, in_stock);
        self
    }

    pub fn set_stock(&self, sku_code: impl Into<String>, in_stock: bool) {
        if let Ok(mut stock) = self.stock.write() {
            stock.insert(sku_code.into(), in_stock);
        }
    }

    /// Make every subsequent call fail with `err` (`None` restores service).
    pub fn set_failure(&self, err: Option<InventoryError>) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = err;
        }
    }

    /// Number of `check_stock` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InventoryLookup for StaticInventory {
    async fn check_stock(&self, sku_codes: &[String]) -> Result<Vec<InventoryResponse>, InventoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.failure.read().ok().and_then(|f| f.clone()) {
            return Err(err);
        }

        let stock = self
            .stock
            .read()
            .map_err(|_| InventoryError::Transport("stock table lock poisoned".to_string()))?;

        Ok(sku_codes
            .iter()
            .filter_map(|sku| stock.get(sku).map(|in_stock| InventoryResponse::new(sku.clone(), *in_stock)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skus(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn answers_known_skus_in_request_order() {
        let inv = StaticInventory::new().with_stock("A", true).with_stock("B", false);

        let res = inv.check_stock(&skus(&["B", "A", "C"])).await.unwrap();

        assert_eq!(
            res,
            vec![InventoryResponse::new("B", false), InventoryResponse::new("A", true)]
        );
        assert_eq!(inv.calls(), 1);
    }

    #[tokio::test]
    async fn injected_failure_is_returned_until_cleared() {
        let inv = StaticInventory::new().with_stock("A", true);
        inv.set_failure(Some(InventoryError::Timeout));
        assert_eq!(inv.check_stock(&skus(&["A"])).await, Err(InventoryError::Timeout));

        inv.set_failure(None);
        assert!(inv.check_stock(&skus(&["A"])).await.is_ok());
        assert_eq!(inv.calls(), 2);
    }
}
