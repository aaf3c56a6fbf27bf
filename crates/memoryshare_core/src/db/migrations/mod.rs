//! Ordered schema steps for the key-value table.
//!
//! Steps run inside one transaction; `PRAGMA user_version` records the last
//! applied step so reopening a migrated file is a no-op.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, Transaction};

/// (version, SQL) pairs, ascending by version.
const STEPS: &[(u32, &str)] = &[(1, include_str!("0001_kv_entries.sql"))];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |(version, _)| *version)
}

/// Brings `conn` up to [`latest_version`].
///
/// # Errors
/// - [`DbError::UnsupportedSchemaVersion`] when the file is already ahead.
/// - [`DbError::Sqlite`] when a step fails; nothing is applied in that case.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_version(conn)?;
    let to = latest_version();
    if from > to {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: to,
        });
    }
    if from == to {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, sql) in STEPS.iter().filter(|(version, _)| *version > from) {
        run_step(&tx, *version, sql)?;
    }
    tx.commit()?;
    info!("event=db_migrate module=db status=ok from_version={from} to_version={to}");
    Ok(())
}

fn run_step(tx: &Transaction<'_>, version: u32, sql: &str) -> DbResult<()> {
    tx.execute_batch(sql)?;
    tx.pragma_update(None, "user_version", version)?;
    Ok(())
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
