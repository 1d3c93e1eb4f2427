use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{Entity, ProductId};

/// Caller-supplied product fields, used for both create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

/// Catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    price: Decimal,
}

impl Product {
    /// Materialise a draft under a store-assigned id.
    pub fn from_draft(id: ProductId, draft: ProductDraft) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
        }
    }

    /// Replace every mutable field; the id is kept.
    pub fn apply_draft(&mut self, draft: ProductDraft) {
        self.name = draft.name;
        self.description = draft.description;
        self.price = draft.price;
    }

    pub fn product_id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> Decimal {
        self.price
    }
}

impl Entity for Product {
    type Id = ProductId;

    const KIND: &'static str = "product";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, price: Decimal) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            description: format!("{name} description"),
            price,
        }
    }

    #[test]
    fn from_draft_keeps_fields_and_id() {
        let p = Product::from_draft(ProductId::new(1), draft("iPhone 13", Decimal::new(120000, 2)));
        assert_eq!(p.product_id(), ProductId::new(1));
        assert_eq!(p.name(), "iPhone 13");
        assert_eq!(p.description(), "iPhone 13 description");
        assert_eq!(p.price(), Decimal::new(120000, 2));
    }

    #[test]
    fn apply_draft_replaces_fields_but_not_id() {
        let mut p = Product::from_draft(ProductId::new(9), draft("old", Decimal::ONE));
        p.apply_draft(draft("new", Decimal::TEN));
        assert_eq!(p.product_id(), ProductId::new(9));
        assert_eq!(p.name(), "new");
        assert_eq!(p.price(), Decimal::TEN);
        assert_eq!(p.describe(), "product 9");
    }
}
