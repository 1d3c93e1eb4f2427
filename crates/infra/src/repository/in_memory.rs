//! In-memory repositories for tests/dev.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use storefront_catalog::{Product, ProductDraft};
use storefront_core::{Entity, OrderNumber, ProductId};
use storefront_orders::Order;

use super::{OrderRepository, ProductRepository, RepositoryError};

/// Order store keyed by order number.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    inner: RwLock<HashMap<OrderNumber, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders. Poisoned locks read as empty.
    pub fn len(&self) -> usize {
        self.inner.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut orders = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        if orders.contains_key(&order.order_number()) {
            return Err(RepositoryError::Conflict(format!("{} already exists", order.describe())));
        }
        orders.insert(order.order_number(), order.clone());
        Ok(())
    }

    async fn find(&self, order_number: &OrderNumber) -> Result<Option<Order>, RepositoryError> {
        let orders = self.inner.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(orders.get(order_number).cloned())
    }
}

#[derive(Debug)]
struct ProductTable {
    last_id: i64,
    rows: BTreeMap<ProductId, Product>,
}

/// Product store with a monotonically increasing id sequence.
///
/// Ids of deleted products are never reused.
#[derive(Debug)]
pub struct InMemoryProductRepository {
    inner: RwLock<ProductTable>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ProductTable {
                last_id: 0,
                rows: BTreeMap::new(),
            }),
        }
    }
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, draft: ProductDraft) -> Result<Product, RepositoryError> {
        let mut table = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        table.last_id += 1;
        let id = ProductId::new(table.last_id);
        let product = Product::from_draft(id, draft);
        table.rows.insert(id, product.clone());
        Ok(product)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let table = self.inner.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(table.rows.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let table = self.inner.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(table.rows.values().cloned().collect())
    }

    async fn update(&self, id: ProductId, draft: ProductDraft) -> Result<Option<Product>, RepositoryError> {
        let mut table = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        Ok(table.rows.get_mut(&id).map(|p| {
            p.apply_draft(draft);
            p.clone()
        }))
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut table = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        Ok(table.rows.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use storefront_orders::{PlaceOrder, PlaceOrderLine};

    fn order() -> Order {
        let request = PlaceOrder::new(vec![PlaceOrderLine {
            sku_code: "A".to_string(),
            price: Decimal::ONE,
            quantity: 1,
        }]);
        Order::from_request(OrderNumber::new(), request, Utc::now()).unwrap()
    }

    fn draft(name: &str) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            description: String::new(),
            price: Decimal::new(999, 2),
        }
    }

    #[tokio::test]
    async fn orders_insert_and_find() {
        let repo = InMemoryOrderRepository::new();
        let o = order();

        repo.insert(&o).await.unwrap();

        assert_eq!(repo.find(&o.order_number()).await.unwrap(), Some(o));
        assert_eq!(repo.find(&OrderNumber::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn each_order_is_found_by_its_own_number() {
        let repo = InMemoryOrderRepository::new();
        let orders: Vec<Order> = (0..100).map(|_| order()).collect();
        for o in &orders {
            repo.insert(o).await.unwrap();
        }

        assert_eq!(repo.len(), 100);
        for o in &orders {
            assert_eq!(repo.find(&o.order_number()).await.unwrap().as_ref(), Some(o));
        }
    }

    #[tokio::test]
    async fn duplicate_order_number_is_a_conflict() {
        let repo = InMemoryOrderRepository::new();
        let o = order();
        repo.insert(&o).await.unwrap();

        let err = repo.insert(&o).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn product_ids_are_sequential_and_not_reused() {
        let repo = InMemoryProductRepository::new();
        let a = repo.create(draft("a")).await.unwrap();
        let b = repo.create(draft("b")).await.unwrap();
        assert_eq!(a.product_id(), ProductId::new(1));
        assert_eq!(b.product_id(), ProductId::new(2));

        assert!(repo.delete(b.product_id()).await.unwrap());
        let c = repo.create(draft("c")).await.unwrap();
        assert_eq!(c.product_id(), ProductId::new(3));
    }

    #[tokio::test]
    async fn product_crud_lifecycle() {
        let repo = InMemoryProductRepository::new();
        let created = repo.create(draft("phone")).await.unwrap();
        let id = created.product_id();

        assert_eq!(repo.get(id).await.unwrap(), Some(created));

        let updated = repo.update(id, draft("tablet")).await.unwrap().unwrap();
        assert_eq!(updated.name(), "tablet");
        assert_eq!(repo.list().await.unwrap(), vec![updated]);

        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.delete(id).await.unwrap());
        assert_eq!(repo.get(id).await.unwrap(), None);
        assert_eq!(repo.update(id, draft("gone")).await.unwrap(), None);
    }
}
