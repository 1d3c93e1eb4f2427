//! Order placement domain.
//!
//! Pure decision logic for turning an order request into a storable order
//! and deciding, from an inventory response, whether it may be placed.
//! No IO: the workflow that calls inventory, storage and the event bus lives
//! in `storefront-infra`.

pub mod order;
pub mod stock;

pub use order::{Order, OrderLineItem, OrderPlacedEvent, PlaceOrder, PlaceOrderLine};
pub use stock::{InventoryResponse, StockVerdict};
