//! `orders` table.

use rusqlite::params;
use tracing::{debug, warn};

use super::{format_timestamp, parse_timestamp, Storage};
use crate::error::Result;
use crate::store::Order;

impl Storage {
    /// Insert a placed order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_order(&self, order: &Order) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO orders (id, user_id, items, total_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                order.id,
                order.user_id,
                serde_json::to_string(&order.items)?,
                order.total_cents,
                format_timestamp(order.created_at),
            ],
        )?;
        debug!(order_id = %order.id, total_cents = order.total_cents, "inserted order");
        Ok(())
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn orders_for_user(&self, user_id: &str) -> Result<Vec<Order>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, user_id, items, total_cents, created_at
            FROM orders WHERE user_id = ?1
            ORDER BY created_at DESC, rowid DESC
            ",
        )?;
        let orders = stmt
            .query_map([user_id], |row| {
                let items_json: String = row.get(2)?;
                let created_at: String = row.get(4)?;
                let id: String = row.get(0)?;
                let items = serde_json::from_str(&items_json).unwrap_or_else(|e| {
                    warn!("Unreadable items for order {}: {}", id, e);
                    Vec::new()
                });
                Ok(Order {
                    id,
                    user_id: row.get(1)?,
                    items,
                    total_cents: row.get(3)?,
                    created_at: parse_timestamp(&created_at),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(orders)
    }
}
