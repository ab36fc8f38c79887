//! Storefront: catalog, cart and orders.
//!
//! Prices are carried as integer cents and only turned into dollars for
//! display.

pub mod cart;
pub mod catalog;
pub mod orders;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use cart::{Cart, CartLine, CartView, ADDED_TO_CART};
pub use catalog::{Catalog, ProductForm};
pub use orders::{Orders, ORDER_SAVED};

use crate::error::{Error, Result};

/// Highest price the product form accepts, in cents.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

/// Most units of one product a cart line may hold.
pub const MAX_QUANTITY: i64 = 999;

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Row id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Price in cents.
    pub price_cents: i64,
    /// Free-form category labels.
    pub categories: Vec<String>,
    /// Units on hand; `None` means stock is not tracked.
    pub inventory_count: Option<i64>,
    /// Public address of the product photo.
    pub image_url: Option<String>,
    /// Whether the product is listed in the store.
    pub is_active: bool,
    /// When the product was added.
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Untracked stock is always available.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.inventory_count.map_or(true, |count| count > 0)
    }
}

/// Validated product fields ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Price in cents.
    pub price_cents: i64,
    /// Category labels.
    pub categories: Vec<String>,
    /// Units on hand.
    pub inventory_count: Option<i64>,
    /// Public address of the product photo.
    pub image_url: Option<String>,
    /// Whether the product is listed.
    pub is_active: bool,
}

/// A row in a user's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Row id.
    pub id: String,
    /// Owner.
    pub user_id: String,
    /// Product in the cart.
    pub product_id: String,
    /// Units, always at least one.
    pub quantity: i64,
    /// When the product was first added.
    pub created_at: DateTime<Utc>,
}

/// Snapshot of one cart line at the time an order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product that was ordered.
    pub product_id: String,
    /// Product name at order time.
    pub name: String,
    /// Unit price in cents at order time.
    pub price_cents: i64,
    /// Units ordered.
    pub quantity: i64,
}

impl OrderItem {
    /// Price times quantity.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the product does not fit in cents.
    pub fn line_total(&self) -> Result<i64> {
        line_total(self.price_cents, self.quantity)
    }
}

/// Price times quantity, refusing totals that overflow.
pub(crate) fn line_total(price_cents: i64, quantity: i64) -> Result<i64> {
    price_cents.checked_mul(quantity).ok_or_else(total_too_large)
}

/// Sum line totals, refusing totals that overflow.
pub(crate) fn sum_totals(totals: impl IntoIterator<Item = Result<i64>>) -> Result<i64> {
    totals.into_iter().try_fold(0_i64, |sum, total| {
        sum.checked_add(total?).ok_or_else(total_too_large)
    })
}

fn total_too_large() -> Error {
    Error::validation("This order total is too large.")
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Row id.
    pub id: String,
    /// Customer.
    pub user_id: String,
    /// Item snapshot.
    pub items: Vec<OrderItem>,
    /// Sum of all line totals, in cents.
    pub total_cents: i64,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

/// Format cents as US dollars, e.g. `$1,250.00`.
#[must_use]
pub fn format_usd(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let dollars = (abs / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{:02}", abs % 100)
}

/// Parse a non-negative dollar amount such as `12`, `12.5` or `$12.50`.
///
/// Returns `None` for anything else, including more than two decimals and
/// amounts above [`MAX_PRICE_CENTS`].
#[must_use]
pub fn parse_price(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return None;
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };
    if fraction.len() > 2
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
        || (whole.is_empty() && fraction.is_empty())
    {
        return None;
    }

    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let cents: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };
    whole
        .checked_mul(100)?
        .checked_add(cents)
        .filter(|&total| total <= MAX_PRICE_CENTS)
}
