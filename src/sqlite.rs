use std::fmt;
use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Batch, OpenFlags};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Result, TableError};
use crate::table::{ResultSet, Table};

/// Catalog query listing every table in the database file.
pub const LIST_TABLES_SQL: &str = "SELECT name FROM sqlite_master WHERE type = 'table';";

/// Path used when no database file is given.
pub const DEFAULT_DB_PATH: &str = "data.sqlite";

/// Core value types for SQLite cells
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(r) => Value::Real(r),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r:?}"),
            Value::Text(s) => f.write_str(s),
            Value::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// SQLite accessor configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SqliteConfig {
    /// Path to the SQLite database file
    pub db_path: String,
}

impl SqliteConfig {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DB_PATH)
    }
}

/// Read-only connection to one database file.
///
/// Open until [`Connection::close`] is called; every operation after that
/// fails with [`TableError::UseAfterClose`]. The connection also remembers
/// the column names of the last query it ran, see [`Connection::columns_of`].
#[derive(Debug)]
pub struct Connection {
    path: String,
    inner: Option<rusqlite::Connection>,
    last_columns: Vec<String>,
}

impl Connection {
    /// Open an existing database file read-only.
    ///
    /// The schema catalog is probed once so that a file which is not a
    /// database is rejected here rather than on the first query.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_string_lossy().to_string();
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = rusqlite::Connection::open_with_flags(&path, flags).map_err(|source| {
            TableError::Connection {
                path: path.clone(),
                source,
            }
        })?;

        if let Err(source) = conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        }) {
            return Err(TableError::Connection { path, source });
        }

        info!("opened sqlite database at path: {path}");
        Ok(Self {
            path,
            inner: Some(conn),
            last_columns: Vec::new(),
        })
    }

    pub fn from_config(config: &SqliteConfig) -> Result<Self> {
        Self::open(&config.db_path)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    fn handle(&self) -> Result<&rusqlite::Connection> {
        self.inner.as_ref().ok_or_else(|| TableError::UseAfterClose {
            path: self.path.clone(),
        })
    }

    /// Names of all tables, in the order the catalog returns them.
    pub fn list_tables(&mut self) -> Result<Vec<String>> {
        let set = self.query(LIST_TABLES_SQL)?;
        Ok(set
            .rows
            .into_iter()
            .filter_map(|row| match row.into_iter().next() {
                Some(Value::Text(name)) => Some(name),
                _ => None,
            })
            .collect())
    }

    /// Run a read query and fetch every row.
    ///
    /// Exactly one statement is allowed. On success the query's column names
    /// replace the connection's current column metadata; on failure the
    /// metadata is cleared.
    pub fn query(&mut self, sql: &str) -> Result<ResultSet> {
        let fetched = fetch_all(self.handle()?, sql);
        match fetched {
            Ok(set) => {
                debug!(rows = set.rows.len(), columns = set.columns.len(), "query: {sql}");
                self.last_columns = set.columns.clone();
                Ok(set)
            }
            Err(source) => {
                warn!("query failed: {source} (sql: {sql})");
                self.last_columns.clear();
                Err(TableError::Query {
                    sql: sql.to_string(),
                    source,
                })
            }
        }
    }

    /// Column names of the most recent query on this connection.
    ///
    /// Empty before the first query and after a failed one.
    pub fn columns_of(&self) -> Result<&[String]> {
        self.handle()?;
        Ok(&self.last_columns)
    }

    /// One-step `query` + `columns_of`, combined into a [`Table`].
    pub fn query_as_table(&mut self, sql: &str) -> Result<Table> {
        let set = self.query(sql)?;
        Table::new(self.columns_of()?.to_vec(), set.rows)
    }

    /// The table listing as a one-column (`name`) table.
    pub fn read_tables(&mut self) -> Result<Table> {
        self.query_as_table(LIST_TABLES_SQL)
    }

    /// Release the connection. A second call fails with `UseAfterClose`.
    pub fn close(&mut self) -> Result<()> {
        let conn = self.inner.take().ok_or_else(|| TableError::UseAfterClose {
            path: self.path.clone(),
        })?;
        self.last_columns.clear();
        conn.close().map_err(|(_, source)| TableError::Connection {
            path: self.path.clone(),
            source,
        })?;
        info!("closed sqlite database at path: {}", self.path);
        Ok(())
    }
}

/// Fetch every row of the single statement in `sql`.
///
/// SQL holding only whitespace or comments yields an empty set with no
/// columns; a second statement is rejected.
fn fetch_all(conn: &rusqlite::Connection, sql: &str) -> rusqlite::Result<ResultSet> {
    let mut batch = Batch::new(conn, sql);
    let Some(mut stmt) = batch.next()? else {
        return Ok(ResultSet::default());
    };
    if batch.next()?.is_some() {
        return Err(rusqlite::Error::MultipleStatement);
    }

    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();

    let mut rows = Vec::new();
    let mut cursor = stmt.query([])?;
    while let Some(row) = cursor.next()? {
        let mut values = Vec::with_capacity(width);
        for i in 0..width {
            values.push(Value::from(row.get_ref(i)?));
        }
        rows.push(values);
    }
    Ok(ResultSet { columns, rows })
}

/// Open `path`, run `f`, and close the connection on every exit path.
///
/// An error returned by `f` wins over an error raised while closing.
pub fn with_connection<P, T, F>(path: P, f: F) -> Result<T>
where
    P: AsRef<Path>,
    F: FnOnce(&mut Connection) -> Result<T>,
{
    let mut conn = Connection::open(path)?;
    let outcome = f(&mut conn);
    let closed = if conn.is_open() { conn.close() } else { Ok(()) };
    let value = outcome?;
    closed?;
    Ok(value)
}
