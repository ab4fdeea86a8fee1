//! Schema migrations, tracked in SQLite's `user_version` header field.

use crate::error::{Result, StoreError};
use rusqlite::Connection;

struct Migration {
    name: &'static str,
    sql: &'static str,
}

/// Applied in order; a migration's version is its position plus one.
const MIGRATIONS: &[Migration] = &[Migration {
    name: "001_init",
    sql: include_str!("../migrations/001_init.sql"),
}];

pub fn latest_version() -> i64 {
    MIGRATIONS.len() as i64
}

pub fn run_migrations(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    let current = schema_version(&tx)?;
    let latest = latest_version();

    if current > latest {
        return Err(StoreError::Migration(format!(
            "db version {} newer than available migrations {}",
            current, latest
        )));
    }
    if current == latest {
        return Ok(());
    }

    for (version, migration) in (1_i64..).zip(MIGRATIONS).skip(current as usize) {
        tracing::debug!(migration = migration.name, version, "applying migration");
        tx.execute_batch(migration.sql).map_err(|err| {
            StoreError::Migration(format!("{} failed: {}", migration.name, err))
        })?;
        tx.pragma_update(None, "user_version", version)?;
    }

    tx.commit()?;
    tracing::info!(from = current, to = latest, "schema migrated");
    Ok(())
}

pub fn schema_version(conn: &Connection) -> Result<i64> {
    let version = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}
