//! Order persistence core for a desktop storefront.
//!
//! The GUI, login screen and product catalog live elsewhere; this crate owns
//! everything between "checkout" and "order history on screen":
//! - Shopping cart and order snapshot model
//! - Human-readable flat-file order log, extended append-only
//! - Incremental, fault-tolerant log parser for startup reloads
//! - FIFO processing queue decoupling order placement from fulfillment
//!
//! Everything is synchronous and single-threaded: operations run to
//! completion on the calling thread and the store assumes it is the only
//! writer of its log file.

pub mod checkout;
pub mod domain;
pub mod queue;
pub mod store;

pub use checkout::place_order;
pub use domain::aggregates::{Cart, CartItem, Order, OrderLine, Product};
pub use domain::value_objects::Money;
pub use queue::OrderQueue;
pub use store::{OrderStore, DEFAULT_ORDERS_FILE};

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Failures surfaced by the durable store. Per-record parse problems during
/// load are not represented here: they are logged and skipped, never fatal.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("order log I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
