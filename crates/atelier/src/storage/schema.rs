//! `SQLite` schema definitions for atelier.
//!
//! One table per backend collection: editable content, the identity provider
//! (users, sessions, profiles) and the storefront (products, cart, orders).

/// Page content overrides, unique per `(page, content_key)`.
pub const CREATE_SITE_CONTENT_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS site_content (
    page TEXT NOT NULL,
    content_key TEXT NOT NULL,
    content_value TEXT NOT NULL,
    content_type TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (page, content_key)
)
";

/// Accounts known to the identity provider.
pub const CREATE_USERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,
    salt TEXT NOT NULL,
    created_at TEXT NOT NULL
)
";

/// Per-user profile carrying the admin flag.
pub const CREATE_PROFILES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
    is_admin INTEGER NOT NULL DEFAULT 0
)
";

/// Open sign-in sessions.
pub const CREATE_SESSIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL
)
";

/// Storefront catalog. Prices are stored in cents.
pub const CREATE_PRODUCTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS products (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    price_cents INTEGER NOT NULL,
    categories TEXT NOT NULL DEFAULT '[]',
    inventory_count INTEGER,
    image_url TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
)
";

/// Cart rows, one per `(user_id, product_id)`.
pub const CREATE_CART_ITEMS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS cart_items (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    product_id TEXT NOT NULL,
    quantity INTEGER NOT NULL CHECK (quantity > 0),
    created_at TEXT NOT NULL,
    UNIQUE (user_id, product_id)
)
";

/// Placed orders with a JSON snapshot of their items.
pub const CREATE_ORDERS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS orders (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id),
    items TEXT NOT NULL,
    total_cents INTEGER NOT NULL,
    created_at TEXT NOT NULL
)
";

/// Index for listing the catalog in creation order.
pub const CREATE_PRODUCTS_CREATED_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_products_created ON products(created_at)
";

/// Index for loading a user's cart.
pub const CREATE_CART_USER_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_cart_items_user ON cart_items(user_id, created_at)
";

/// Index for a user's order history.
pub const CREATE_ORDERS_USER_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id, created_at DESC)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Tables and indexes of the first schema version, in creation order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_SITE_CONTENT_TABLE,
    CREATE_USERS_TABLE,
    CREATE_PROFILES_TABLE,
    CREATE_SESSIONS_TABLE,
    CREATE_PRODUCTS_TABLE,
    CREATE_CART_ITEMS_TABLE,
    CREATE_ORDERS_TABLE,
    CREATE_PRODUCTS_CREATED_INDEX,
    CREATE_CART_USER_INDEX,
    CREATE_ORDERS_USER_INDEX,
];
