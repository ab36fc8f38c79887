//! Error types for atelier.
//!
//! Every fallible operation in the crate returns [`Result`]. The `Display`
//! output of each variant is written to be shown to a site visitor or
//! administrator as-is, which is what [`crate::status::Status`] relies on.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for atelier operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// An object could not be written to or read from a bucket.
    #[error("storage bucket '{bucket}' error: {message}")]
    Bucket {
        /// Bucket name.
        bucket: String,
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// The backend URL or key is missing.
    #[error("Set your backend project URL and public key before using the site.")]
    BackendNotConfigured,

    // === Content Errors ===
    /// The page identifier is not one the site knows about.
    #[error("Unknown page.")]
    UnknownPage {
        /// The page identifier that was requested.
        page: String,
    },

    /// A page template could not be read.
    #[error("Unable to load page template.")]
    TemplateLoad {
        /// Template path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Markup could not be scanned or rewritten.
    #[error("markup error: {0}")]
    Markup(String),

    /// A stored value type was not recognised.
    #[error("unknown content type: {0}")]
    UnknownValueType(String),

    // === Auth Errors ===
    /// Email or password was blank.
    #[error("Enter your email and password.")]
    MissingCredentials,

    /// Email/password pair did not match a user.
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// An account already exists for the email.
    #[error("User already registered")]
    UserExists,

    /// The operation needs a signed-in user.
    #[error("Sign in to continue.")]
    NotSignedIn,

    /// The signed-in user is not an administrator.
    #[error("You do not have admin access.")]
    Forbidden,

    // === Store Errors ===
    /// Product form input was rejected.
    #[error("{message}")]
    Validation {
        /// Message to show next to the form.
        message: String,
    },

    /// The product does not exist or is not for sale.
    #[error("Unable to add this item right now.")]
    ProductUnavailable {
        /// Requested product id.
        product_id: String,
    },

    /// The product has no inventory left.
    #[error("This item is currently out of stock.")]
    OutOfStock {
        /// Requested product id.
        product_id: String,
    },

    /// Checkout was attempted with nothing in the cart.
    #[error("Your cart is empty.")]
    EmptyCart,

    /// A row that the caller referenced does not exist.
    #[error("{what} not found: {id}")]
    NotFound {
        /// Kind of row.
        what: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for atelier operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a new markup error.
    #[must_use]
    pub fn markup(message: impl Into<String>) -> Self {
        Self::Markup(message.into())
    }

    /// Create a form validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a bucket error.
    #[must_use]
    pub fn bucket(bucket: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Bucket {
            bucket: bucket.into(),
            message: message.into(),
        }
    }

    /// Check if this error means the caller must sign in (again).
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::NotSignedIn | Self::InvalidCredentials | Self::MissingCredentials
        )
    }

    /// Check if this error means the caller lacks admin rights.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden)
    }
}
