//! Cart Aggregate

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::aggregates::product::Product;
use crate::domain::value_objects::Money;

/// One cart entry: a product and how many of it the shopper wants.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> Money {
        self.product.price().multiply(self.quantity)
    }
}

/// Shopping cart. Holds at most one entry per distinct product id; adding a
/// product that is already present merges quantities instead of creating a
/// second entry.
///
/// Enumeration order is newest-distinct-product-first, and consumers rely on
/// it staying that way.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds `quantity` of `product`, merging into the existing entry when
    /// the product id is already in the cart. New products go to the front.
    /// The caller guarantees `quantity > 0`.
    pub fn add_item(&mut self, product: Product, quantity: u32) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.product.id() == product.id()) {
            existing.quantity += quantity;
        } else {
            self.items.insert(0, CartItem { product, quantity });
        }
    }

    /// Removes the entry for `product_id`; no-op when absent.
    pub fn remove_item(&mut self, product_id: &str) {
        self.items.retain(|i| i.product.id() != product_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn calculate_total(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero(), |acc, i| acc.add(&i.line_total()))
    }
}

impl fmt::Display for Cart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            writeln!(f, "{} x {}", item.product.name(), item.quantity)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn widget() -> Product {
        Product::new("P1", "Widget", Money::new(Decimal::new(999, 2)), 100)
    }

    fn gadget() -> Product {
        Product::new("P2", "Gadget", Money::new(Decimal::new(2500, 2)), 10)
    }

    #[test]
    fn test_add_merges_by_id() {
        let mut cart = Cart::new();
        cart.add_item(widget(), 2);
        cart.add_item(widget(), 3);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn test_newest_distinct_product_first() {
        let mut cart = Cart::new();
        cart.add_item(widget(), 1);
        cart.add_item(gadget(), 1);
        cart.add_item(widget(), 1); // merge, position unchanged
        let ids: Vec<&str> = cart.iter().map(|i| i.product.id()).collect();
        assert_eq!(ids, vec!["P2", "P1"]);
    }

    #[test]
    fn test_remove_then_empty_total() {
        let mut cart = Cart::new();
        cart.add_item(widget(), 4);
        cart.remove_item("P1");
        assert!(cart.is_empty());
        assert!(cart.calculate_total().is_zero());
        // removing an absent id is a no-op
        cart.remove_item("P1");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_calculate_total() {
        let mut cart = Cart::new();
        cart.add_item(widget(), 2);
        cart.add_item(gadget(), 1);
        assert_eq!(cart.calculate_total().to_string(), "44.98");
    }
}
