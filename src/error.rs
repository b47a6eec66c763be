use thiserror::Error;

/// Errors surfaced by the table accessor.
///
/// Nothing is retried or swallowed internally; every failure reaches the caller.
#[derive(Debug, Error)]
pub enum TableError {
    /// The file is missing, unreadable, or not an SQLite database.
    #[error("connection: cannot open {path}: {source}")]
    Connection {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Malformed SQL, an unknown table/column, or a rejected write.
    /// The connection stays open.
    #[error("query: {source} (sql: {sql})")]
    Query {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("use after close: connection to {path} is already closed")]
    UseAfterClose { path: String },

    #[error("shape: row {row} has {found} values, expected {expected}")]
    Shape {
        row: usize,
        expected: usize,
        found: usize,
    },
}

pub type Result<T> = std::result::Result<T, TableError>;
