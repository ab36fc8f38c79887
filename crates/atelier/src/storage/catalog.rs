//! `products` table.

use rusqlite::{params, OptionalExtension};
use tracing::{debug, warn};

use super::{format_timestamp, parse_timestamp, Storage};
use crate::error::Result;
use crate::store::{Product, ProductDraft};

const PRODUCT_COLUMNS: &str = "id, name, description, price_cents, categories, \
                               inventory_count, image_url, is_active, created_at";

impl Storage {
    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_product(&self, product: &Product) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO products (id, name, description, price_cents, categories,
                                  inventory_count, image_url, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
            params![
                product.id,
                product.name,
                product.description,
                product.price_cents,
                serde_json::to_string(&product.categories)?,
                product.inventory_count,
                product.image_url,
                product.is_active,
                format_timestamp(product.created_at),
            ],
        )?;
        debug!(product_id = %product.id, "inserted product");
        Ok(())
    }

    /// Overwrite the editable fields of a product. Returns whether it exists.
    ///
    /// An image is only replaced when the draft carries one.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_product(&self, id: &str, draft: &ProductDraft) -> Result<bool> {
        let affected = self.conn.execute(
            r"
            UPDATE products SET
                name = ?2,
                description = ?3,
                price_cents = ?4,
                categories = ?5,
                inventory_count = ?6,
                image_url = COALESCE(?7, image_url),
                is_active = ?8
            WHERE id = ?1
            ",
            params![
                id,
                draft.name,
                draft.description,
                draft.price_cents,
                serde_json::to_string(&draft.categories)?,
                draft.inventory_count,
                draft.image_url,
                draft.is_active,
            ],
        )?;
        Ok(affected > 0)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_product(&self, id: &str) -> Result<Option<Product>> {
        let product = self
            .conn
            .query_row(
                &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"),
                [id],
                Self::row_to_product,
            )
            .optional()?;
        Ok(product)
    }

    /// List products in creation order, optionally only the listed ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_products(&self, active_only: bool) -> Result<Vec<Product>> {
        let filter = if active_only { "WHERE is_active = 1" } else { "" };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products {filter} ORDER BY created_at ASC, rowid ASC"
        ))?;
        let products = stmt
            .query_map([], Self::row_to_product)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(products)
    }

    /// Delete a product. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_product(&self, id: &str) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM products WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    fn row_to_product(row: &rusqlite::Row) -> rusqlite::Result<Product> {
        let categories_json: String = row.get(4)?;
        let created_at: String = row.get(8)?;

        let categories = serde_json::from_str(&categories_json).unwrap_or_else(|e| {
            warn!("Unreadable product categories {}: {}", categories_json, e);
            Vec::new()
        });

        Ok(Product {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            price_cents: row.get(3)?,
            categories,
            inventory_count: row.get(5)?,
            image_url: row.get(6)?,
            is_active: row.get(7)?,
            created_at: parse_timestamp(&created_at),
        })
    }
}
