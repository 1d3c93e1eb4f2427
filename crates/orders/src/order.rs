use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, OrderNumber};
use storefront_events::Event;

/// One requested line: SKU, unit price, quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderLine {
    pub sku_code: String,
    pub price: Decimal,
    pub quantity: i32,
}

/// Command: place an order for the given lines.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub lines: Vec<PlaceOrderLine>,
}

impl PlaceOrder {
    pub fn new(lines: Vec<PlaceOrderLine>) -> Self {
        Self { lines }
    }
}

/// Stored order line. Owned by exactly one [`Order`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    /// 1-based position within the order request.
    pub line_no: u32,
    pub sku_code: String,
    pub quantity: i32,
    pub price: Decimal,
}

/// A placed order. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    order_number: OrderNumber,
    placed_at: DateTime<Utc>,
    line_items: Vec<OrderLineItem>,
}

impl Order {
    /// Build an order from a request.
    ///
    /// Line fields are copied as-is; quantity and price are not bounds-checked.
    /// The only rejection is an empty request. `placed_at` is truncated to
    /// microseconds, the precision the order table stores.
    pub fn from_request(
        order_number: OrderNumber,
        request: PlaceOrder,
        placed_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if request.lines.is_empty() {
            return Err(DomainError::validation("order must contain at least one line item"));
        }

        let line_items = request
            .lines
            .into_iter()
            .zip(1u32..)
            .map(|(line, line_no)| OrderLineItem {
                line_no,
                sku_code: line.sku_code,
                quantity: line.quantity,
                price: line.price,
            })
            .collect();

        Ok(Self {
            order_number,
            placed_at: placed_at.trunc_subsecs(6),
            line_items,
        })
    }

    /// Reassemble a stored order (repository reads).
    pub fn from_parts(
        order_number: OrderNumber,
        placed_at: DateTime<Utc>,
        mut line_items: Vec<OrderLineItem>,
    ) -> Self {
        line_items.sort_by_key(|l| l.line_no);
        Self {
            order_number,
            placed_at,
            line_items,
        }
    }

    pub fn order_number(&self) -> OrderNumber {
        self.order_number
    }

    pub fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }

    pub fn line_items(&self) -> &[OrderLineItem] {
        &self.line_items
    }

    /// Distinct SKU codes referenced by the order, in first-seen order.
    pub fn sku_codes(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.line_items.len());
        for item in &self.line_items {
            if !out.iter().any(|s| s == &item.sku_code) {
                out.push(item.sku_code.clone());
            }
        }
        out
    }
}

impl Entity for Order {
    type Id = OrderNumber;

    const KIND: &'static str = "order";

    fn id(&self) -> &Self::Id {
        &self.order_number
    }
}

/// Notification sent once an order has been stored.
///
/// Wire shape: `{"orderNumber": "<uuid>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPlacedEvent {
    pub order_number: OrderNumber,
}

impl OrderPlacedEvent {
    pub fn for_order(order: &Order) -> Self {
        Self {
            order_number: order.order_number(),
        }
    }
}

impl Event for OrderPlacedEvent {
    fn event_type(&self) -> &'static str {
        "order.placed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(sku: &str, quantity: i32, price: Decimal) -> PlaceOrderLine {
        PlaceOrderLine {
            sku_code: sku.to_string(),
            price,
            quantity,
        }
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn from_request_copies_line_fields_unchanged() {
        let number = OrderNumber::new();
        let request = PlaceOrder::new(vec![
            line("A", 2, Decimal::new(1000, 2)),
            line("B", 1, Decimal::new(500, 2)),
        ]);

        let order = Order::from_request(number, request, test_time()).unwrap();

        assert_eq!(order.order_number(), number);
        assert_eq!(
            order.line_items(),
            &[
                OrderLineItem {
                    line_no: 1,
                    sku_code: "A".to_string(),
                    quantity: 2,
                    price: Decimal::new(1000, 2),
                },
                OrderLineItem {
                    line_no: 2,
                    sku_code: "B".to_string(),
                    quantity: 1,
                    price: Decimal::new(500, 2),
                },
            ]
        );
    }

    #[test]
    fn from_request_does_not_validate_bounds() {
        let request = PlaceOrder::new(vec![line("A", -4, Decimal::new(-1, 0))]);
        let order = Order::from_request(OrderNumber::new(), request, test_time()).unwrap();
        assert_eq!(order.line_items()[0].quantity, -4);
        assert_eq!(order.line_items()[0].price, Decimal::new(-1, 0));
    }

    #[test]
    fn empty_request_is_rejected() {
        let err = Order::from_request(OrderNumber::new(), PlaceOrder::default(), test_time())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn sku_codes_are_distinct_in_first_seen_order() {
        let request = PlaceOrder::new(vec![
            line("B", 1, Decimal::ONE),
            line("A", 1, Decimal::ONE),
            line("B", 3, Decimal::ONE),
        ]);
        let order = Order::from_request(OrderNumber::new(), request, test_time()).unwrap();
        assert_eq!(order.sku_codes(), vec!["B".to_string(), "A".to_string()]);
    }

    #[test]
    fn placed_at_is_kept_to_microseconds() {
        let at = DateTime::parse_from_rfc3339("2024-05-01T10:00:00.123456789Z")
            .unwrap()
            .with_timezone(&Utc);
        let request = PlaceOrder::new(vec![line("A", 1, Decimal::ONE)]);

        let order = Order::from_request(OrderNumber::new(), request, at).unwrap();

        assert_eq!(order.placed_at().timestamp_subsec_nanos(), 123_456_000);
        // A stored copy read back at microsecond precision compares equal.
        let reloaded = Order::from_parts(order.order_number(), order.placed_at(), order.line_items().to_vec());
        assert_eq!(reloaded, order);
    }

    #[test]
    fn from_parts_restores_line_order() {
        let items = vec![
            OrderLineItem { line_no: 2, sku_code: "B".into(), quantity: 1, price: Decimal::ONE },
            OrderLineItem { line_no: 1, sku_code: "A".into(), quantity: 1, price: Decimal::ONE },
        ];
        let order = Order::from_parts(OrderNumber::new(), test_time(), items);
        assert_eq!(order.line_items()[0].sku_code, "A");
        assert_eq!(order.line_items()[1].sku_code, "B");
    }

    #[test]
    fn placed_event_carries_only_the_order_number() {
        let number = OrderNumber::new();
        let request = PlaceOrder::new(vec![line("A", 1, Decimal::ONE)]);
        let order = Order::from_request(number, request, test_time()).unwrap();

        let event = OrderPlacedEvent::for_order(&order);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json, serde_json::json!({ "orderNumber": number.to_string() }));
        assert_eq!(event.event_type(), "order.placed");
        assert_eq!(order.describe(), format!("order {number}"));
    }
}
