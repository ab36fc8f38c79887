//! Schema versioning for the atelier database.
//!
//! The `metadata` table records the version that has been applied. Opening a
//! database applies every step of [`MIGRATIONS`] above that version, each in
//! its own transaction.

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::error::{Error, Result};

use super::schema::{CREATE_METADATA_TABLE, SCHEMA_STATEMENTS};

/// One step of the schema history.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    /// Version the database is at once the step is applied.
    pub version: i32,
    /// What the step does.
    pub description: &'static str,
    /// Statements run by the step.
    pub statements: &'static [&'static str],
}

/// Every schema step, oldest first.
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "content, accounts and storefront tables",
    statements: SCHEMA_STATEMENTS,
}];

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// The version a fully migrated database is at.
#[must_use]
pub fn current_version() -> i32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Bring the database schema up to date.
///
/// # Errors
///
/// Returns an error if the stored version is unreadable or a step fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.execute(CREATE_METADATA_TABLE, [])?;

    let applied = schema_version(conn)?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > applied) {
        apply(conn, migration)?;
    }
    Ok(())
}

fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for statement in migration.statements {
        tx.execute(statement, []).map_err(|e| Error::DatabaseMigration {
            message: format!("version {}: {e}", migration.version),
        })?;
    }
    set_schema_version(&tx, migration.version)?;
    tx.commit()?;
    info!(version = migration.version, "{}", migration.description);
    Ok(())
}

/// Stored schema version; 0 for a fresh database.
fn schema_version(conn: &Connection) -> Result<i32> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    match value {
        None => Ok(0),
        Some(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT INTO metadata (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}
