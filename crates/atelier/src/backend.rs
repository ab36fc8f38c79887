//! The backend a site talks to: database tables plus file buckets.

use std::path::PathBuf;

use tracing::info;

use crate::buckets::ObjectStore;
use crate::config::Config;
use crate::error::Result;
use crate::storage::Storage;

/// Handle to the tables and buckets of one project.
#[derive(Debug)]
pub struct Backend {
    /// Database tables.
    pub storage: Storage,
    /// Uploaded files.
    pub buckets: ObjectStore,
}

impl Backend {
    /// Open the backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::BackendNotConfigured`] when the project URL or
    /// key is blank, or an error if the database cannot be opened.
    pub fn open(config: &Config) -> Result<Self> {
        config.backend.ensure_configured()?;

        let storage = Storage::open(config.database_path())?;
        let buckets = ObjectStore::new(config.buckets_dir(), &config.backend.project_url);
        info!(project_url = %config.backend.project_url, "backend ready");
        Ok(Self { storage, buckets })
    }

    /// An in-memory database with buckets under `buckets_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn in_memory(buckets_dir: impl Into<PathBuf>, project_url: &str) -> Result<Self> {
        Ok(Self {
            storage: Storage::open_in_memory()?,
            buckets: ObjectStore::new(buckets_dir, project_url),
        })
    }
}
