//! Product Aggregate

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Money;

/// Catalog product referenced by cart entries. Everything but the stock
/// level is fixed at creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    id: String,
    name: String,
    price: Money,
    stock: u32,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money, stock: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            stock,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    pub fn set_stock(&mut self, stock: u32) {
        self.stock = stock;
    }
}
