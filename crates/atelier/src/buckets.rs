//! File buckets for uploaded images.
//!
//! Objects live on disk under `{root}/{bucket}/{path}` and are published at
//! `{project_url}/storage/v1/object/public/{bucket}/{path}`, which the page
//! server serves straight from the same directory.

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Bucket holding images uploaded through the content editor.
pub const SITE_IMAGES: &str = "site-images";

/// Bucket holding product photos.
pub const PRODUCT_IMAGES: &str = "product-images";

/// Every bucket objects may be written to.
pub const BUCKETS: &[&str] = &[SITE_IMAGES, PRODUCT_IMAGES];

/// URL path under which public objects are served.
pub const PUBLIC_PREFIX: &str = "/storage/v1/object/public";

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Original file name; only its extension is kept.
    pub file_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Read an upload from a local file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { file_name, bytes })
    }

    /// Lowercased extension of the file name, `bin` when there is none.
    #[must_use]
    pub fn extension(&self) -> String {
        Path::new(&self.file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| "bin".to_string())
    }
}

/// Object store rooted at a directory.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    root: PathBuf,
    public_base: String,
}

impl ObjectStore {
    /// Create a store writing under `root` and publishing under `project_url`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, project_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base: format!("{}{PUBLIC_PREFIX}", project_url.trim_end_matches('/')),
        }
    }

    /// Directory holding all buckets.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Public address of an object.
    #[must_use]
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/{bucket}/{}", self.public_base, path.trim_start_matches('/'))
    }

    /// Write an object and return its public address.
    ///
    /// With `upsert`, an existing object at the same path is replaced;
    /// otherwise it is an error.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown bucket, an unsafe path, an existing
    /// object without `upsert`, or a failed write.
    pub fn upload(&self, bucket: &str, path: &str, bytes: &[u8], upsert: bool) -> Result<String> {
        let target = self.object_path(bucket, path)?;
        if !upsert && target.exists() {
            return Err(Error::bucket(bucket, format!("object already exists: {path}")));
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&target, bytes)?;

        info!(%bucket, %path, size = bytes.len(), "uploaded object");
        Ok(self.public_url(bucket, path))
    }

    /// Local file backing an object.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown bucket or a path that would escape it.
    pub fn object_path(&self, bucket: &str, path: &str) -> Result<PathBuf> {
        if !BUCKETS.contains(&bucket) {
            return Err(Error::bucket(bucket, "bucket not found"));
        }

        let relative = Path::new(path);
        let safe = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(Error::bucket(bucket, format!("invalid object path: {path}")));
        }

        debug!(%bucket, %path, "resolved object path");
        Ok(self.root.join(bucket).join(relative))
    }
}

/// Lowercase `name`, replacing each run of characters other than ASCII
/// letters and digits with a single `-`.
///
/// # Errors
///
/// Returns an error if the pattern fails to compile.
pub fn slug(name: &str) -> Result<String> {
    let pattern = Regex::new(r"(?i)[^a-z0-9]+").map_err(|e| Error::internal(e.to_string()))?;
    Ok(pattern.replace_all(name, "-").to_lowercase())
}

/// Object path for an upload: `{prefix}/{slug(name)}-{millis}.{ext}`.
///
/// # Errors
///
/// Returns an error if the slug pattern fails to compile.
pub fn upload_path(prefix: &str, name: &str, upload: &Upload, at: DateTime<Utc>) -> Result<String> {
    Ok(format!(
        "{prefix}/{}-{}.{}",
        slug(name)?,
        at.timestamp_millis(),
        upload.extension()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str) -> Upload {
        Upload {
            file_name: name.to_string(),
            bytes: b"img".to_vec(),
        }
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("hero-title").unwrap(), "hero-title");
        assert_eq!(slug("Hero Image #1").unwrap(), "hero-image-1");
        assert_eq!(slug("Café  Crème").unwrap(), "caf-cr-me");
        assert_eq!(slug("  x  ").unwrap(), "-x-");
    }

    #[test]
    fn test_extension() {
        assert_eq!(upload("photo.JPG").extension(), "jpg");
        assert_eq!(upload("archive.tar.gz").extension(), "gz");
        assert_eq!(upload("noext").extension(), "bin");
    }

    #[test]
    fn test_upload_path() {
        let at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let path = upload_path("content", "Hero BG", &upload("a.png"), at).unwrap();
        assert_eq!(path, "content/hero-bg-1700000000123.png");
    }

    #[test]
    fn test_public_url() {
        let store = ObjectStore::new("/tmp/x", "https://project.test/");
        assert_eq!(
            store.public_url(SITE_IMAGES, "content/a.png"),
            "https://project.test/storage/v1/object/public/site-images/content/a.png"
        );
    }

    #[test]
    fn test_upload_writes_and_upserts() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(dir.path(), "http://127.0.0.1:8080");

        let url = store
            .upload(PRODUCT_IMAGES, "products/a.png", b"one", false)
            .unwrap();
        assert!(url.ends_with("/product-images/products/a.png"));
        let file = dir.path().join("product-images/products/a.png");
        assert_eq!(std::fs::read(&file).unwrap(), b"one");

        assert!(store
            .upload(PRODUCT_IMAGES, "products/a.png", b"two", false)
            .is_err());
        store
            .upload(PRODUCT_IMAGES, "products/a.png", b"two", true)
            .unwrap();
        assert_eq!(std::fs::read(&file).unwrap(), b"two");
    }

    #[test]
    fn test_rejects_unsafe_paths() {
        let store = ObjectStore::new("/tmp/x", "http://localhost");
        for path in ["", "../escape.png", "/abs.png", "a/../../b.png"] {
            assert!(store.object_path(SITE_IMAGES, path).is_err(), "{path}");
        }
        assert!(store.object_path("other-bucket", "a.png").is_err());
        assert!(store.object_path(SITE_IMAGES, "content/a.png").is_ok());
    }
}
