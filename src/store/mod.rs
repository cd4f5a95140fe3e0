//! SQLite persistent store
//!
//! Holds the three tables the submission core works against:
//! - `submissions`: one row per (url, site), the idempotency boundary
//! - `pending_items`: CMS items seen through change events, one row per (site, item)
//! - `sites`: credentials written by the OAuth side, read-only to the core
//!
//! The connection sits behind a mutex; every operation is a short statement
//! or transaction, so callers on the async runtime hold it only briefly.

mod migrations;
mod pending;
mod sites;
mod submissions;

pub use migrations::{apply_migrations, SCHEMA_VERSION};
pub use submissions::NewSubmission;

use crate::error::{Error, Result};
use crate::types::ChannelStatus;
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Handle to the indexflow database
///
/// Cheap to clone; clones share one connection.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open (or create) the database at `path` and apply migrations
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database (tests, dry runs)
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` with exclusive access to the connection
    pub(crate) fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| Error::Internal("store connection lock poisoned".to_string()))?;
        f(&mut guard)
    }
}

/// Configure a connection with the settings the store relies on
fn configure(conn: &Connection) -> Result<()> {
    // WAL for concurrent readers; in-memory databases keep their own mode
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    Ok(())
}

/// Current time as stored (epoch milliseconds)
pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub(crate) fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub(crate) fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

impl ToSql for ChannelStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ChannelStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: Error| FromSqlError::Other(Box::new(e)))
    }
}
