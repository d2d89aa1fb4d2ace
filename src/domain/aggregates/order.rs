//! Order Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::cart::Cart;
use crate::domain::value_objects::Money;

/// Order ids are this prefix followed by the creation instant in
/// milliseconds since the epoch, e.g. `ORD1699999999999`.
pub const ORDER_ID_PREFIX: &str = "ORD";

/// One cart entry as captured at checkout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderLine {
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Immutable snapshot of a checked-out cart.
///
/// The total is captured once at checkout and trusted verbatim on reload —
/// it is never recomputed from the lines, so a hand-edited log keeps
/// whatever total its header says.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    order_id: String,
    username: String,
    items: Vec<OrderLine>,
    total: Money,
    timestamp: DateTime<Utc>,
}

impl Order {
    /// Builds the checkout snapshot: lines in cart order, the cart's
    /// computed total, and an id derived from the creation instant.
    pub fn place(username: impl Into<String>, cart: &Cart) -> Self {
        let timestamp = Utc::now();
        let order_id = format!("{ORDER_ID_PREFIX}{}", timestamp.timestamp_millis());
        let items = cart
            .iter()
            .map(|i| OrderLine {
                product_id: i.product.id().to_string(),
                name: i.product.name().to_string(),
                quantity: i.quantity,
                unit_price: i.product.price(),
            })
            .collect();
        Self {
            order_id,
            username: username.into(),
            items,
            total: cart.calculate_total(),
            timestamp,
        }
    }

    /// Reassembles a persisted order. The stored id, total and timestamp are
    /// taken as-is.
    pub fn from_parts(
        order_id: impl Into<String>,
        username: impl Into<String>,
        items: Vec<OrderLine>,
        total: Money,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            username: username.into(),
            items,
            total,
            timestamp,
        }
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn items(&self) -> &[OrderLine] {
        &self.items
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::Product;
    use rust_decimal::Decimal;

    #[test]
    fn test_place_snapshots_cart() {
        let mut cart = Cart::new();
        cart.add_item(
            Product::new("P1", "Widget", Money::new(Decimal::new(999, 2)), 100),
            2,
        );
        cart.add_item(
            Product::new("P2", "Gadget", Money::new(Decimal::new(2500, 2)), 10),
            1,
        );
        let order = Order::place("alice", &cart);

        assert_eq!(
            order.order_id(),
            format!("{ORDER_ID_PREFIX}{}", order.timestamp().timestamp_millis())
        );
        assert_eq!(order.username(), "alice");
        assert_eq!(order.total().to_string(), "44.98");
        // lines follow cart order: newest distinct product first
        assert_eq!(order.items()[0].product_id, "P2");
        assert_eq!(order.items()[1].product_id, "P1");
        assert_eq!(order.items()[1].line_total().to_string(), "19.98");
    }

    #[test]
    fn test_snapshot_outlives_cart() {
        let mut cart = Cart::new();
        cart.add_item(Product::new("P1", "Widget", Money::zero(), 1), 1);
        let order = Order::place("bob", &cart);
        cart.clear();
        assert_eq!(order.items().len(), 1);
    }
}
