//! Checkout: turns a cart into a placed, durable order.

use crate::domain::aggregates::cart::Cart;
use crate::domain::aggregates::order::Order;
use crate::queue::OrderQueue;
use crate::store::OrderStore;
use crate::Result;

/// Places an order for `username` from the current cart contents: computes
/// the total, snapshots the items, queues the order for processing, then
/// appends it to the durable store. Returns the placed order; the caller
/// owns clearing or replacing the cart afterwards.
///
/// The queue and the store diverge deliberately — the queue is the pending
/// worklist, the store the permanent history — so a processed order
/// disappears from one and stays in the other.
pub fn place_order(
    cart: &Cart,
    username: &str,
    store: &mut OrderStore,
    queue: &mut OrderQueue,
) -> Result<Order> {
    let order = Order::place(username, cart);
    queue.enqueue(order.clone());
    store.save_order(order.clone())?;
    Ok(order)
}
