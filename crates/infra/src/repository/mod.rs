//! Storage ports and their adapters.
//!
//! The traits are the seam the workflow and the HTTP layer depend on; the
//! in-memory adapters back dev/tests, the Postgres adapters back production.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use storefront_catalog::{Product, ProductDraft};
use storefront_core::{OrderNumber, ProductId};
use storefront_orders::Order;

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryOrderRepository, InMemoryProductRepository};
pub use postgres::{PostgresOrderRepository, PostgresProductRepository};

/// Storage failure.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A row with the same key already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Database/driver failure (connection, query, decode).
    #[error("database error: {0}")]
    Database(String),

    /// In-memory store lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Orders are written once and read back; there is no update or delete.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Store the order and all its line items as one unit.
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError>;

    async fn find(&self, order_number: &OrderNumber) -> Result<Option<Order>, RepositoryError>;
}

#[async_trait]
impl<R> OrderRepository for Arc<R>
where
    R: OrderRepository + ?Sized,
{
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError> {
        (**self).insert(order).await
    }

    async fn find(&self, order_number: &OrderNumber) -> Result<Option<Order>, RepositoryError> {
        (**self).find(order_number).await
    }
}

/// Generated-id product store.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Assign the next sequential id and store the product.
    async fn create(&self, draft: ProductDraft) -> Result<Product, RepositoryError>;

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// All products, ascending id.
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Replace the product's fields. `None` when the id is unknown.
    async fn update(&self, id: ProductId, draft: ProductDraft) -> Result<Option<Product>, RepositoryError>;

    /// `false` when the id is unknown.
    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError>;
}

#[async_trait]
impl<R> ProductRepository for Arc<R>
where
    R: ProductRepository + ?Sized,
{
    async fn create(&self, draft: ProductDraft) -> Result<Product, RepositoryError> {
        (**self).create(draft).await
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        (**self).get(id).await
    }

    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        (**self).list().await
    }

    async fn update(&self, id: ProductId, draft: ProductDraft) -> Result<Option<Product>, RepositoryError> {
        (**self).update(id, draft).await
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        (**self).delete(id).await
    }
}
