//! Stock check decision.

use serde::{Deserialize, Serialize};

/// Per-SKU availability as reported by the inventory service.
///
/// Wire shape: `{"skuCode": "...", "isInStock": true}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryResponse {
    pub sku_code: String,
    pub is_in_stock: bool,
}

impl InventoryResponse {
    pub fn new(sku_code: impl Into<String>, is_in_stock: bool) -> Self {
        Self {
            sku_code: sku_code.into(),
            is_in_stock,
        }
    }
}

/// Outcome of comparing the requested SKUs with an inventory response.
///
/// An order may be placed only when [`StockVerdict::is_satisfied`] holds:
/// every requested SKU has at least one entry, and every entry for a
/// requested SKU reports in stock.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StockVerdict {
    /// Requested SKUs with at least one entry reporting out of stock.
    pub out_of_stock: Vec<String>,
    /// Requested SKUs absent from the response.
    pub missing: Vec<String>,
}

impl StockVerdict {
    /// Entries for SKUs that were not requested are ignored.
    pub fn evaluate(requested: &[String], responses: &[InventoryResponse]) -> Self {
        let mut verdict = StockVerdict::default();

        for sku in requested {
            let mut seen = false;
            let mut in_stock = true;
            for r in responses.iter().filter(|r| &r.sku_code == sku) {
                seen = true;
                in_stock &= r.is_in_stock;
            }

            if !seen {
                verdict.missing.push(sku.clone());
            } else if !in_stock {
                verdict.out_of_stock.push(sku.clone());
            }
        }

        verdict
    }

    pub fn is_satisfied(&self) -> bool {
        self.out_of_stock.is_empty() && self.missing.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn skus(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn all_in_stock_is_satisfied() {
        let verdict = StockVerdict::evaluate(
            &skus(&["A", "B"]),
            &[InventoryResponse::new("A", true), InventoryResponse::new("B", true)],
        );
        assert!(verdict.is_satisfied());
    }

    #[test]
    fn one_out_of_stock_fails_and_is_named() {
        let verdict = StockVerdict::evaluate(
            &skus(&["A", "X"]),
            &[InventoryResponse::new("A", true), InventoryResponse::new("X", false)],
        );
        assert!(!verdict.is_satisfied());
        assert_eq!(verdict.out_of_stock, skus(&["X"]));
        assert!(verdict.missing.is_empty());
    }

    #[test]
    fn short_response_is_not_all_in_stock() {
        let verdict = StockVerdict::evaluate(
            &skus(&["A", "B"]),
            &[InventoryResponse::new("A", true)],
        );
        assert!(!verdict.is_satisfied());
        assert_eq!(verdict.missing, skus(&["B"]));
    }

    #[test]
    fn empty_response_for_requested_skus_fails() {
        let verdict = StockVerdict::evaluate(&skus(&["A"]), &[]);
        assert_eq!(verdict.missing, skus(&["A"]));
    }

    #[test]
    fn unrequested_entries_are_ignored() {
        let verdict = StockVerdict::evaluate(
            &skus(&["A"]),
            &[InventoryResponse::new("A", true), InventoryResponse::new("Z", false)],
        );
        assert!(verdict.is_satisfied());
    }

    #[test]
    fn conflicting_duplicate_entries_count_as_out_of_stock() {
        let verdict = StockVerdict::evaluate(
            &skus(&["A"]),
            &[InventoryResponse::new("A", true), InventoryResponse::new("A", false)],
        );
        assert_eq!(verdict.out_of_stock, skus(&["A"]));
    }

    #[test]
    fn response_decodes_from_inventory_wire_format() {
        let parsed: Vec<InventoryResponse> =
            serde_json::from_str(r#"[{"skuCode":"iphone_13","isInStock":true}]"#).unwrap();
        assert_eq!(parsed, vec![InventoryResponse::new("iphone_13", true)]);
    }

    proptest! {
        #[test]
        fn satisfied_iff_every_requested_sku_reported_in_stock(
            stock in proptest::collection::btree_map("[a-e]", proptest::option::of(any::<bool>()), 1..5)
        ) {
            let requested: Vec<String> = stock.keys().cloned().collect();
            let responses: Vec<InventoryResponse> = stock
                .iter()
                .filter_map(|(sku, s)| s.map(|in_stock| InventoryResponse::new(sku.clone(), in_stock)))
                .collect();

            let verdict = StockVerdict::evaluate(&requested, &responses);
            let expected = stock.values().all(|s| *s == Some(true));

            prop_assert_eq!(verdict.is_satisfied(), expected);
            prop_assert_eq!(
                verdict.missing.len() + verdict.out_of_stock.len(),
                stock.values().filter(|s| **s != Some(true)).count()
            );
        }
    }
}
