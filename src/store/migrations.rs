//! Embedded schema migrations
//!
//! Each migration runs once, inside a transaction, and is recorded in
//! `schema_version`. Reapplying is a no-op.

use crate::error::Result;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

struct Migration {
    id: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    id: "001_initial_schema",
    sql: include_str!("../../migrations/001_initial_schema.sql"),
}];

/// Identifier of the newest embedded migration
pub const SCHEMA_VERSION: &str = "001_initial_schema";

/// Apply all pending migrations to the database
pub fn apply_migrations(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY,
            migration_id TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    for migration in MIGRATIONS {
        apply_migration(conn, migration)?;
    }

    Ok(())
}

fn apply_migration(conn: &mut Connection, migration: &Migration) -> Result<()> {
    let already_applied = conn
        .query_row(
            "SELECT 1 FROM schema_version WHERE migration_id = ?1",
            [migration.id],
            |_| Ok(()),
        )
        .optional()?
        .is_some();

    if already_applied {
        return Ok(());
    }

    debug!("Applying migration {}", migration.id);

    let tx = conn.transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at) VALUES (?1, ?2)",
        params![migration.id, super::now_millis()],
    )?;
    tx.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idempotency() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        apply_migrations(&mut conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_latest_version_recorded() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();

        let latest: String = conn
            .query_row(
                "SELECT migration_id FROM schema_version ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(latest, SCHEMA_VERSION);
    }
}
