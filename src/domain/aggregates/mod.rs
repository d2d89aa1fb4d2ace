//! Aggregates module

pub mod cart;
pub mod order;
pub mod product;

pub use cart::{Cart, CartItem};
pub use order::{Order, OrderLine};
pub use product::Product;
