//! `atelier` - Studio website with editable page content and a small storefront
//!
//! This library provides the content overrides behind the site's pages, the
//! backend they are stored in, the product catalog with carts and orders,
//! and the page server.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod auth;
pub mod backend;
pub mod buckets;
pub mod cli;
pub mod config;
pub mod content;
pub mod error;
pub mod logging;
pub mod pages;
pub mod server;
pub mod status;
pub mod storage;
pub mod store;

pub use backend::Backend;
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use status::{Status, StatusLevel};
pub use storage::{Storage, StorageStats};
