//! SQLite storage bootstrap, schema migrations and transaction scopes.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the publisher catalog.
//! - Apply schema migrations in deterministic order.
//! - Verify that a connection is fully migrated before services use it.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write catalog data before migrations succeed.
//! - Every service call runs inside exactly one scope from [`scope`].

use rusqlite::Connection;
use thiserror::Error;

pub mod migrations;
mod open;
pub mod scope;

pub use open::{open_db, open_db_in_memory};
pub use scope::{read_only, read_write, ReadScope, WriteScope};

pub type DbResult<T> = Result<T, DbError>;

const REQUIRED_TABLES: &[&str] = &["publishers", "books"];

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    #[error("connection requires schema version {expected_version}, got {actual_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("connection is missing required table `{0}`")]
    MissingRequiredTable(&'static str),
}

/// Checks that `conn` has every migration applied and the catalog tables exist.
///
/// Connections from [`open_db`] / [`open_db_in_memory`] always pass.
pub fn ensure_schema_ready(conn: &Connection) -> DbResult<()> {
    let expected_version = migrations::latest_version();
    let actual_version = migrations::current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(DbError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(DbError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
