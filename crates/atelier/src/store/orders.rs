//! Checkout and order history.

use chrono::Utc;
use tracing::{info, warn};

use super::{sum_totals, Order, OrderItem};
use crate::auth::User;
use crate::error::{Error, Result};
use crate::storage::{new_id, Storage};

/// Shown after a successful checkout.
pub const ORDER_SAVED: &str = "Order saved. The studio will follow up for payment and pickup.";

/// Order operations for one user.
#[derive(Debug, Clone, Copy)]
pub struct Orders<'a> {
    storage: &'a Storage,
    user: &'a User,
}

impl<'a> Orders<'a> {
    /// Orders of `user`.
    #[must_use]
    pub fn new(storage: &'a Storage, user: &'a User) -> Self {
        Self { storage, user }
    }

    /// Turn the cart into an order, then empty the cart.
    ///
    /// The two writes are separate. A failure to clear the cart is logged and
    /// the saved order is still returned, leaving its rows in the cart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyCart`] when there is nothing to order.
    pub fn checkout(&self) -> Result<Order> {
        let lines = self.storage.cart_lines(&self.user.id)?;
        if lines.is_empty() {
            return Err(Error::EmptyCart);
        }

        let items: Vec<OrderItem> = lines
            .into_iter()
            .map(|line| OrderItem {
                product_id: line.product_id,
                name: line.name,
                price_cents: line.price_cents,
                quantity: line.quantity,
            })
            .collect();
        let total_cents = sum_totals(items.iter().map(OrderItem::line_total))?;
        let order = Order {
            id: new_id(),
            user_id: self.user.id.clone(),
            total_cents,
            items,
            created_at: Utc::now(),
        };

        self.storage.insert_order(&order)?;
        info!(order_id = %order.id, total_cents = order.total_cents, "order placed");

        if let Err(e) = self.storage.clear_cart(&self.user.id) {
            warn!(order_id = %order.id, error = %e, "order saved but cart not cleared");
        }
        Ok(order)
    }

    /// Past orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn history(&self) -> Result<Vec<Order>> {
        self.storage.orders_for_user(&self.user.id)
    }
}
