//! Read-only SQLite access that loads query results into labeled tables.
//!
//! # Intention
//!
//! - Query a pre-existing database file two ways: row tuples plus separately
//!   fetched column names, or a single labeled [`Table`].
//! - Keep each query's rows and column names paired explicitly.
//!
//! # Architectural Boundaries
//!
//! - Only read access to a single file; no writes, pooling or migrations.
//! - Connections are exclusive to the caller and released on every exit path.

pub mod error;
pub mod sqlite;
pub mod table;

pub use error::{Result, TableError};
pub use sqlite::{with_connection, Connection, SqliteConfig, Value, LIST_TABLES_SQL};
pub use table::{ResultSet, Row, Table};
