//! Saving content overrides from the admin editor.

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use super::{scan, ContentOverride, ValueType};
use crate::backend::Backend;
use crate::buckets::{upload_path, Upload, SITE_IMAGES};
use crate::error::{Error, Result};
use crate::pages;

/// Shown next to a field once it is stored.
pub const SAVED: &str = "Saved.";

const CONTENT_PREFIX: &str = "content";

/// One editable field as the admin editor shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentField {
    /// Content key.
    pub key: String,
    /// Stored type, else the type found in the template.
    pub value_type: ValueType,
    /// Value found in the template.
    pub default_value: String,
    /// Stored value, else the template value.
    pub value: String,
    /// Whether an override is stored for this page.
    pub saved: bool,
}

/// Writes overrides and uploaded images.
#[derive(Debug, Clone, Copy)]
pub struct ContentWriter<'a> {
    backend: &'a Backend,
}

impl<'a> ContentWriter<'a> {
    /// Write through `backend`.
    #[must_use]
    pub fn new(backend: &'a Backend) -> Self {
        Self { backend }
    }

    /// Store `value` for `(page, key)`, replacing any earlier value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPage`] for an unregistered page or a storage
    /// error.
    pub fn save(&self, page: &str, key: &str, value: &str, value_type: ValueType) -> Result<ContentOverride> {
        if !pages::is_known(page) {
            return Err(Error::UnknownPage {
                page: page.to_string(),
            });
        }
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::validation("Choose a content key."));
        }

        let row = ContentOverride {
            page: page.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            value_type,
            updated_at: Utc::now(),
        };
        self.backend.storage.upsert_content(&row)?;
        info!(%page, %key, %value_type, "content saved");
        Ok(row)
    }

    /// Upload an image for `(page, key)` and store its public address.
    ///
    /// # Errors
    ///
    /// Returns an error if the page is unknown, the upload fails, or the row
    /// cannot be stored.
    pub fn save_upload(&self, page: &str, key: &str, value_type: ValueType, upload: &Upload) -> Result<ContentOverride> {
        if !pages::is_known(page) {
            return Err(Error::UnknownPage {
                page: page.to_string(),
            });
        }
        let path = upload_path(CONTENT_PREFIX, key, upload, Utc::now())?;
        let url = self
            .backend
            .buckets
            .upload(SITE_IMAGES, &path, &upload.bytes, true)?;
        self.save(page, key, &url, value_type)
    }

    /// Drop the stored value for `(page, key)` so the template value shows
    /// again. Returns whether a value was stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPage`] for an unregistered page or a storage
    /// error.
    pub fn reset(&self, page: &str, key: &str) -> Result<bool> {
        if !pages::is_known(page) {
            return Err(Error::UnknownPage {
                page: page.to_string(),
            });
        }
        let removed = self.backend.storage.delete_content(page, key.trim())?;
        if removed {
            info!(%page, %key, "content reset");
        }
        Ok(removed)
    }

    /// The editable fields of a page: what the template holds, merged with
    /// what is stored for that page.
    ///
    /// # Errors
    ///
    /// Returns an error if the page is unknown, the markup cannot be
    /// scanned, or the rows cannot be read.
    pub fn fields(&self, page: &str, markup: &str) -> Result<Vec<ContentField>> {
        if !pages::is_known(page) {
            return Err(Error::UnknownPage {
                page: page.to_string(),
            });
        }

        let rows = self.backend.storage.content_for_pages(&[page])?;
        let fields = scan(markup, page)?
            .into_iter()
            .map(|default| {
                let record = rows.iter().find(|r| r.key == default.key);
                ContentField {
                    value_type: record.map_or(default.value_type, |r| r.value_type),
                    value: record.map_or_else(|| default.default_value.clone(), |r| r.value.clone()),
                    saved: record.is_some(),
                    key: default.key,
                    default_value: default.default_value,
                }
            })
            .collect();
        Ok(fields)
    }
}
