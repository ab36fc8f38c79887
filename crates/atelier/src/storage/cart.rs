//! `cart_items` table.

use chrono::Utc;
use rusqlite::params;
use tracing::debug;

use super::{format_timestamp, new_id, parse_timestamp, Storage};
use crate::error::Result;
use crate::store::{CartItem, CartLine};

impl Storage {
    /// Add one unit of a product to a user's cart, creating the row if needed.
    ///
    /// Returns the quantity now in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn add_cart_item(&self, user_id: &str, product_id: &str) -> Result<i64> {
        let quantity = self.conn.query_row(
            r"
            INSERT INTO cart_items (id, user_id, product_id, quantity, created_at)
            VALUES (?1, ?2, ?3, 1, ?4)
            ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = quantity + 1
            RETURNING quantity
            ",
            params![new_id(), user_id, product_id, format_timestamp(Utc::now())],
            |row| row.get(0),
        )?;
        debug!(%user_id, %product_id, quantity, "added to cart");
        Ok(quantity)
    }

    /// Set the quantity of a cart row. Returns whether the row exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails, including a
    /// non-positive quantity.
    pub fn update_cart_quantity(&self, user_id: &str, product_id: &str, quantity: i64) -> Result<bool> {
        let affected = self.conn.execute(
            "UPDATE cart_items SET quantity = ?3 WHERE user_id = ?1 AND product_id = ?2",
            params![user_id, product_id, quantity],
        )?;
        Ok(affected > 0)
    }

    /// Remove a product from a user's cart. Returns whether it was there.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_cart_item(&self, user_id: &str, product_id: &str) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM cart_items WHERE user_id = ?1 AND product_id = ?2",
            params![user_id, product_id],
        )?;
        Ok(affected > 0)
    }

    /// Remove every row of a user's cart. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn clear_cart(&self, user_id: &str) -> Result<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM cart_items WHERE user_id = ?1", [user_id])?;
        Ok(removed)
    }

    /// Get the raw cart rows of a user in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn cart_items(&self, user_id: &str) -> Result<Vec<CartItem>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, user_id, product_id, quantity, created_at
            FROM cart_items WHERE user_id = ?1
            ORDER BY created_at ASC, rowid ASC
            ",
        )?;
        let items = stmt
            .query_map([user_id], |row| {
                let created_at: String = row.get(4)?;
                Ok(CartItem {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    product_id: row.get(2)?,
                    quantity: row.get(3)?,
                    created_at: parse_timestamp(&created_at),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Get a user's cart joined with the catalog.
    ///
    /// Rows whose product no longer exists show the product id as the name
    /// and a zero price.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn cart_lines(&self, user_id: &str) -> Result<Vec<CartLine>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT c.product_id, c.quantity, p.name, p.price_cents, p.image_url
            FROM cart_items c LEFT JOIN products p ON p.id = c.product_id
            WHERE c.user_id = ?1
            ORDER BY c.created_at ASC, c.rowid ASC
            ",
        )?;
        let lines = stmt
            .query_map([user_id], |row| {
                let product_id: String = row.get(0)?;
                let name: Option<String> = row.get(2)?;
                let price: Option<i64> = row.get(3)?;
                Ok(CartLine {
                    name: name.unwrap_or_else(|| product_id.clone()),
                    product_id,
                    quantity: row.get(1)?,
                    price_cents: price.unwrap_or(0),
                    image_url: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(lines)
    }
}
