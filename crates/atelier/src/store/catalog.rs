//! Product catalog.

use chrono::Utc;
use tracing::info;

use super::{parse_price, Product, ProductDraft};
use crate::backend::Backend;
use crate::buckets::{upload_path, Upload, PRODUCT_IMAGES};
use crate::error::{Error, Result};

const PRODUCT_PREFIX: &str = "products";

/// Raw product form input, as typed by an administrator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    /// Product name.
    pub name: String,
    /// Price in dollars, e.g. `12.50`.
    pub price: String,
    /// Optional description.
    pub description: String,
    /// Comma-separated category labels.
    pub categories: String,
    /// Units on hand; blank or unreadable means zero.
    pub inventory: String,
    /// Whether the product is listed.
    pub is_active: bool,
}

impl ProductForm {
    /// Check the form and turn it into a draft.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the name is blank or the price does
    /// not parse.
    pub fn validate(&self) -> Result<ProductDraft> {
        let name = self.name.trim();
        let price = parse_price(&self.price);
        let (false, Some(price_cents)) = (name.is_empty(), price) else {
            return Err(Error::validation("Enter a product name and price."));
        };

        let description = self.description.trim();
        let categories = self
            .categories
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();

        Ok(ProductDraft {
            name: name.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            price_cents,
            categories,
            inventory_count: Some(self.inventory.trim().parse::<i64>().unwrap_or(0).max(0)),
            image_url: None,
            is_active: self.is_active,
        })
    }
}

/// Catalog operations.
#[derive(Debug, Clone, Copy)]
pub struct Catalog<'a> {
    backend: &'a Backend,
}

impl<'a> Catalog<'a> {
    /// Operate on `backend`.
    #[must_use]
    pub fn new(backend: &'a Backend) -> Self {
        Self { backend }
    }

    /// Products shown in the store, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_active(&self) -> Result<Vec<Product>> {
        self.backend.storage.list_products(true)
    }

    /// Every product, for the admin table.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_all(&self) -> Result<Vec<Product>> {
        self.backend.storage.list_products(false)
    }

    /// Insert a product, or update it when `id` is given.
    ///
    /// A picked image is uploaded to the product bucket first and its public
    /// address stored with the product.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, [`Error::NotFound`] when
    /// updating a missing product, or an upload/storage error.
    pub fn save(&self, id: Option<&str>, form: &ProductForm, image: Option<&Upload>) -> Result<Product> {
        let mut draft = form.validate()?;
        let storage = &self.backend.storage;
        if let Some(id) = id {
            if storage.get_product(id)?.is_none() {
                return Err(missing_product(id));
            }
        }

        if let Some(upload) = image {
            let path = upload_path(PRODUCT_PREFIX, &draft.name, upload, Utc::now())?;
            let url = self
                .backend
                .buckets
                .upload(PRODUCT_IMAGES, &path, &upload.bytes, true)?;
            draft.image_url = Some(url);
        }

        let product_id = match id {
            Some(id) => {
                if !storage.update_product(id, &draft)? {
                    return Err(missing_product(id));
                }
                id.to_string()
            }
            None => {
                let product = Product {
                    id: crate::storage::new_id(),
                    name: draft.name,
                    description: draft.description,
                    price_cents: draft.price_cents,
                    categories: draft.categories,
                    inventory_count: draft.inventory_count,
                    image_url: draft.image_url,
                    is_active: draft.is_active,
                    created_at: Utc::now(),
                };
                storage.insert_product(&product)?;
                product.id
            }
        };

        info!(%product_id, "saved product");
        storage.get_product(&product_id)?.ok_or_else(|| Error::NotFound {
            what: "product",
            id: product_id,
        })
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it does not exist.
    pub fn delete(&self, id: &str) -> Result<()> {
        if self.backend.storage.delete_product(id)? {
            info!(product_id = %id, "deleted product");
            Ok(())
        } else {
            Err(missing_product(id))
        }
    }
}

fn missing_product(id: &str) -> Error {
    Error::NotFound {
        what: "product",
        id: id.to_string(),
    }
}
