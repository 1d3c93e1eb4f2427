//! Order placement workflow.
//!
//! ```text
//! PlaceOrder
//!   ↓
//! 1. Assign an order number and build the order (fields copied as-is)
//!   ↓
//! 2. One inventory call for every distinct SKU
//!   ↓
//! 3. StockVerdict: every requested SKU reported, every report in stock
//!   ↓                                  ↘ otherwise: OutOfStock, nothing stored
//! 4. Insert order + line items (one transaction in the repository)
//!   ↓
//! 5. Publish OrderPlacedEvent
//! ```
//!
//! The stock check is advisory. Nothing is reserved between steps 2 and 4, so
//! concurrent orders for the same SKU can all be stored.
//!
//! A publish failure in step 5 leaves the order stored and is returned as
//! `PlacementError::Publish`; nothing is rolled back. Network-backed buses
//! bound the publish with their own timeout, so a stalled broker surfaces
//! here as that error rather than a hung request.

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use storefront_core::{DomainError, OrderNumber};
use storefront_events::EventBus;
use storefront_orders::{Order, OrderPlacedEvent, PlaceOrder, StockVerdict};

use crate::inventory::{InventoryError, InventoryLookup};
use crate::repository::{OrderRepository, RepositoryError};

#[derive(Debug, Error)]
pub enum PlacementError {
    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("Product is not in stock, please try again later")]
    OutOfStock {
        out_of_stock: Vec<String>,
        missing: Vec<String>,
    },

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The order is already stored when this is returned.
    #[error("order stored but notification failed: {0}")]
    Publish(String),
}

/// Places orders against an inventory lookup, a store and a notification bus.
///
/// All three are passed in; the service holds no other state.
#[derive(Debug)]
pub struct OrderPlacementService<R, I, B> {
    orders: R,
    inventory: I,
    bus: B,
}

impl<R, I, B> OrderPlacementService<R, I, B> {
    pub fn new(orders: R, inventory: I, bus: B) -> Self {
        Self {
            orders,
            inventory,
            bus,
        }
    }

    pub fn orders(&self) -> &R {
        &self.orders
    }
}

impl<R, I, B> OrderPlacementService<R, I, B>
where
    R: OrderRepository,
    I: InventoryLookup,
    B: EventBus<OrderPlacedEvent>,
{
    pub async fn place_order(&self, request: PlaceOrder) -> Result<Order, PlacementError> {
        let order = Order::from_request(OrderNumber::new(), request, Utc::now())?;
        let order_number = order.order_number();
        let sku_codes = order.sku_codes();

        let responses = self.inventory.check_stock(&sku_codes).await.map_err(|e| {
            warn!(%order_number, error = %e, "inventory lookup failed");
            e
        })?;
        info!(%order_number, ?responses, "inventory response");

        let verdict = StockVerdict::evaluate(&sku_codes, &responses);
        if !verdict.is_satisfied() {
            warn!(
                %order_number,
                out_of_stock = ?verdict.out_of_stock,
                missing = ?verdict.missing,
                "order rejected: stock check failed"
            );
            return Err(PlacementError::OutOfStock {
                out_of_stock: verdict.out_of_stock,
                missing: verdict.missing,
            });
        }

        self.orders.insert(&order).await.map_err(|e| {
            warn!(%order_number, error = %e, "order insert failed");
            e
        })?;
        info!(%order_number, line_items = order.line_items().len(), "order stored");

        let event = OrderPlacedEvent::for_order(&order);
        if let Err(e) = self.bus.publish(event).await {
            warn!(%order_number, error = %e, "order placed event not published");
            return Err(PlacementError::Publish(e.to_string()));
        }
        info!(%order_number, "order placed event published");

        Ok(order)
    }

    pub async fn find_order(&self, order_number: &OrderNumber) -> Result<Option<Order>, PlacementError> {
        Ok(self.orders.find(order_number).await?)
    }
}
