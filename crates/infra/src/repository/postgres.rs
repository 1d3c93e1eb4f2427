//! Postgres-backed repositories.
//!
//! Tables are described in `sql/schema.sql`; nothing here creates them.
//!
//! ## Error Mapping
//!
//! | SQLx error | Postgres code | RepositoryError |
//! |------------|---------------|-----------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | any | `Database` |
//! | PoolClosed / RowNotFound / other | n/a | `Database` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use storefront_catalog::{Product, ProductDraft};
use storefront_core::{OrderNumber, ProductId};
use storefront_orders::{Order, OrderLineItem};

use super::{OrderRepository, ProductRepository, RepositoryError};

/// Order store over `t_orders` + `t_order_line_items`.
///
/// `insert` runs in one explicit transaction: the order row and every line
/// item are committed together or not at all. Every early return drops the
/// `Transaction`, which rolls it back.
#[derive(Debug, Clone)]
pub struct PostgresOrderRepository {
    pool: Arc<PgPool>,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    async fn load_line_items(&self, order_number: Uuid) -> Result<Vec<OrderLineItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, LineItemRow>(
            r#"
            SELECT line_no, sku_code, price, quantity
            FROM t_order_line_items
            WHERE order_number = $1
            ORDER BY line_no
            "#,
        )
        .bind(order_number)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_line_items", e))?;

        Ok(rows.into_iter().map(LineItemRow::into_item).collect())
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    #[instrument(skip_all, fields(order_number = %order.order_number(), line_items = order.line_items().len()), err)]
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO t_orders (order_number, placed_at)
            VALUES ($1, $2)
            "#,
        )
        .bind(*order.order_number().as_uuid())
        .bind(order.placed_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_order", e))?;

        for item in order.line_items() {
            sqlx::query(
                r#"
                INSERT INTO t_order_line_items (order_number, line_no, sku_code, price, quantity)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(*order.order_number().as_uuid())
            .bind(item.line_no as i32)
            .bind(&item.sku_code)
            .bind(item.price)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_line_item", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(())
    }

    #[instrument(skip_all, fields(order_number = %order_number), err)]
    async fn find(&self, order_number: &OrderNumber) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT order_number, placed_at
            FROM t_orders
            WHERE order_number = $1
            "#,
        )
        .bind(*order_number.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_order", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let line_items = self.load_line_items(row.order_number).await?;
        Ok(Some(row.into_order(line_items)))
    }
}

/// Product store over `t_product`; ids come from its `BIGSERIAL` sequence.
#[derive(Debug, Clone)]
pub struct PostgresProductRepository {
    pool: Arc<PgPool>,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    #[instrument(skip_all, fields(name = %draft.name), err)]
    async fn create(&self, draft: ProductDraft) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO t_product (name, description, price)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, price
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_product", e))?;

        Ok(row.into())
    }

    #[instrument(skip_all, fields(product_id = %id), err)]
    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, description, price
            FROM t_product
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_product", e))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip_all, err)]
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, description, price
            FROM t_product
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip_all, fields(product_id = %id), err)]
    async fn update(&self, id: ProductId, draft: ProductDraft) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE t_product
            SET name = $2, description = $3, price = $4
            WHERE id = $1
            RETURNING id, name, description, price
            "#,
        )
        .bind(id.get())
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip_all, fields(product_id = %id), err)]
    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM t_product WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code() {
                Some(code) if code.as_ref() == "23505" => RepositoryError::Conflict(msg),
                _ => RepositoryError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            RepositoryError::Database(format!("connection pool closed in {}", operation))
        }
        _ => RepositoryError::Database(format!("sqlx error in {}: {}", operation, err)),
    }
}

// SQLx row types

#[derive(Debug)]
struct OrderRow {
    order_number: Uuid,
    placed_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for OrderRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(OrderRow {
            order_number: row.try_get("order_number")?,
            placed_at: row.try_get("placed_at")?,
        })
    }
}

impl OrderRow {
    fn into_order(self, line_items: Vec<OrderLineItem>) -> Order {
        Order::from_parts(OrderNumber::from_uuid(self.order_number), self.placed_at, line_items)
    }
}

#[derive(Debug)]
struct LineItemRow {
    line_no: i32,
    sku_code: String,
    price: Decimal,
    quantity: i32,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for LineItemRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(LineItemRow {
            line_no: row.try_get("line_no")?,
            sku_code: row.try_get("sku_code")?,
            price: row.try_get("price")?,
            quantity: row.try_get("quantity")?,
        })
    }
}

impl LineItemRow {
    fn into_item(self) -> OrderLineItem {
        OrderLineItem {
            line_no: self.line_no as u32,
            sku_code: self.sku_code,
            quantity: self.quantity,
            price: self.price,
        }
    }
}

#[derive(Debug)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price: Decimal,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for ProductRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
        })
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product::from_draft(
            ProductId::new(row.id),
            ProductDraft {
                name: row.name,
                description: row.description,
                price: row.price,
            },
        )
    }
}
