use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_catalog::{Product, ProductDraft};
use storefront_orders::{Order, OrderLineItem, PlaceOrder, PlaceOrderLine};

// -------------------------
// Request DTOs
// -------------------------

/// `POST /api/order` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(default)]
    pub order_line_items_dto_list: Vec<OrderLineItemDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItemDto {
    pub sku_code: String,
    pub price: Decimal,
    pub quantity: i32,
}

impl From<OrderRequest> for PlaceOrder {
    fn from(body: OrderRequest) -> Self {
        PlaceOrder::new(
            body.order_line_items_dto_list
                .into_iter()
                .map(|l| PlaceOrderLine {
                    sku_code: l.sku_code,
                    price: l.price,
                    quantity: l.quantity,
                })
                .collect(),
        )
    }
}

/// `POST/PUT /api/product` body.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
}

impl From<ProductRequest> for ProductDraft {
    fn from(body: ProductRequest) -> Self {
        ProductDraft {
            name: body.name,
            description: body.description,
            price: body.price,
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_number: String,
    pub placed_at: DateTime<Utc>,
    pub order_line_items_list: Vec<OrderLineItemResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItemResponse {
    pub line_no: u32,
    pub sku_code: String,
    pub price: Decimal,
    pub quantity: i32,
}

impl From<&OrderLineItem> for OrderLineItemResponse {
    fn from(item: &OrderLineItem) -> Self {
        Self {
            line_no: item.line_no,
            sku_code: item.sku_code.clone(),
            price: item.price,
            quantity: item.quantity,
        }
    }
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            order_number: order.order_number().to_string(),
            placed_at: order.placed_at(),
            order_line_items_list: order.line_items().iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

impl From<&Product> for ProductResponse {
    fn from(p: &Product) -> Self {
        Self {
            id: p.product_id().get(),
            name: p.name().to_string(),
            description: p.description().to_string(),
            price: p.price(),
        }
    }
}
