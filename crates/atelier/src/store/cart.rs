//! Shopping cart.

use serde::Serialize;
use tracing::debug;

use super::{format_usd, line_total, sum_totals, MAX_QUANTITY};
use crate::auth::User;
use crate::error::{Error, Result};
use crate::storage::Storage;

/// Shown after a product lands in the cart.
pub const ADDED_TO_CART: &str = "Added to cart.";

/// One cart row joined with its product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    /// Product in the cart.
    pub product_id: String,
    /// Product name, or the id when the product is gone.
    pub name: String,
    /// Unit price in cents, zero when the product is gone.
    pub price_cents: i64,
    /// Units.
    pub quantity: i64,
    /// Product photo.
    pub image_url: Option<String>,
}

impl CartLine {
    /// Price times quantity.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the product does not fit in cents.
    pub fn line_total(&self) -> Result<i64> {
        line_total(self.price_cents, self.quantity)
    }
}

/// A user's cart with its total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartView {
    /// Lines in the order they were added.
    pub lines: Vec<CartLine>,
    /// Sum of line totals in cents.
    pub total_cents: i64,
}

impl CartView {
    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total as dollars.
    #[must_use]
    pub fn total_display(&self) -> String {
        format_usd(self.total_cents)
    }
}

/// Cart operations for one user.
#[derive(Debug, Clone, Copy)]
pub struct Cart<'a> {
    storage: &'a Storage,
    user: &'a User,
}

impl<'a> Cart<'a> {
    /// The cart of `user`.
    #[must_use]
    pub fn new(storage: &'a Storage, user: &'a User) -> Self {
        Self { storage, user }
    }

    /// Add one unit of a product. Returns the quantity now in the cart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProductUnavailable`] for an unknown or unlisted
    /// product and [`Error::OutOfStock`] when none are left.
    pub fn add(&self, product_id: &str) -> Result<i64> {
        let product = self
            .storage
            .get_product(product_id)?
            .filter(|p| p.is_active)
            .ok_or_else(|| Error::ProductUnavailable {
                product_id: product_id.to_string(),
            })?;
        if !product.in_stock() {
            return Err(Error::OutOfStock {
                product_id: product_id.to_string(),
            });
        }
        let in_cart = self
            .storage
            .cart_items(&self.user.id)?
            .into_iter()
            .find(|item| item.product_id == product_id)
            .map_or(0, |item| item.quantity);
        if in_cart >= MAX_QUANTITY {
            return Err(Error::validation(format!(
                "Enter a quantity of at most {MAX_QUANTITY}."
            )));
        }
        self.storage.add_cart_item(&self.user.id, product_id)
    }

    /// Set the quantity of a product. Zero or less removes it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the product is not in the cart and a
    /// validation error above [`MAX_QUANTITY`].
    pub fn set_quantity(&self, product_id: &str, quantity: i64) -> Result<()> {
        if quantity > MAX_QUANTITY {
            return Err(Error::validation(format!(
                "Enter a quantity of at most {MAX_QUANTITY}."
            )));
        }
        let found = if quantity <= 0 {
            self.storage.delete_cart_item(&self.user.id, product_id)?
        } else {
            self.storage
                .update_cart_quantity(&self.user.id, product_id, quantity)?
        };
        if !found {
            return Err(self.not_in_cart(product_id));
        }
        debug!(%product_id, quantity, "updated cart");
        Ok(())
    }

    /// Remove a product.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the product is not in the cart.
    pub fn remove(&self, product_id: &str) -> Result<()> {
        if self.storage.delete_cart_item(&self.user.id, product_id)? {
            Ok(())
        } else {
            Err(self.not_in_cart(product_id))
        }
    }

    /// The cart with product details and total.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or the total does
    /// not fit in cents.
    pub fn view(&self) -> Result<CartView> {
        let lines = self.storage.cart_lines(&self.user.id)?;
        let total_cents = sum_totals(lines.iter().map(CartLine::line_total))?;
        Ok(CartView { lines, total_cents })
    }

    fn not_in_cart(&self, product_id: &str) -> Error {
        Error::NotFound {
            what: "cart item",
            id: product_id.to_string(),
        }
    }
}
