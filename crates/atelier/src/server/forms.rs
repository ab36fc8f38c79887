//! Multipart forms posted by the admin editor.

use std::collections::HashMap;

use axum::extract::multipart::{Multipart, MultipartError};
use tracing::debug;

use crate::buckets::Upload;
use crate::error::{Error, Result};

/// Text fields of a multipart form plus the file picked in it, if any.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    upload: Option<Upload>,
}

impl UploadForm {
    /// Read every part of the form. A file input left empty yields no
    /// upload.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the body is not a readable form.
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(unreadable)? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field.bytes().await.map_err(unreadable)?;
                    if !file_name.is_empty() && !bytes.is_empty() {
                        form.upload = Some(Upload {
                            file_name,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                None => {
                    let value = field.text().await.map_err(unreadable)?;
                    form.fields.insert(name, value);
                }
            }
        }
        Ok(form)
    }

    /// Value of a text field, empty when it was not sent.
    #[must_use]
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map_or("", String::as_str)
    }

    /// Whether a checkbox was ticked.
    #[must_use]
    pub fn checked(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// The picked file.
    #[must_use]
    pub fn upload(&self) -> Option<&Upload> {
        self.upload.as_ref()
    }
}

fn unreadable(err: MultipartError) -> Error {
    debug!(error = %err, "unreadable form");
    Error::validation("Unable to read the submitted form.")
}
