//! Key-value repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Store opaque serialized values under string keys.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Keys are non-empty.
//! - `set` overwrites prior contents of the key (last write wins).

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for key-value persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Key is empty or whitespace-only.
    InvalidKey(String),
    /// A previous holder of the connection lock panicked.
    Poisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidKey(key) => write!(f, "invalid storage key `{key}`"),
            Self::Poisoned => write!(f, "storage connection lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidKey(_) | Self::Poisoned => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable key-value storage.
///
/// Implementations must be shareable with the background writer thread.
pub trait KvRepository: Send + Sync {
    fn get(&self, key: &str) -> RepoResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> RepoResult<()>;
}

/// SQLite-backed key-value repository over the `kv_entries` table.
pub struct SqliteKvRepository {
    conn: Mutex<Connection>,
}

impl SqliteKvRepository {
    /// Takes ownership of a migrated connection (see [`crate::db::open_db`]).
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RepoError::Poisoned)
    }
}

impl KvRepository for SqliteKvRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        validate_key(key)?;
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        validate_key(key)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

fn validate_key(key: &str) -> RepoResult<()> {
    if key.trim().is_empty() {
        return Err(RepoError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{KvRepository, RepoError, SqliteKvRepository};
    use crate::db::open_db_in_memory;

    fn repo() -> SqliteKvRepository {
        SqliteKvRepository::new(open_db_in_memory().unwrap())
    }

    #[test]
    fn get_missing_key_returns_none() {
        assert_eq!(repo().get("absent").unwrap(), None);
    }

    #[test]
    fn set_overwrites_previous_value() {
        let repo = repo();
        repo.set("k", "one").unwrap();
        repo.set("k", "two").unwrap();
        assert_eq!(repo.get("k").unwrap().as_deref(), Some("two"));
        assert_eq!(repo.get("other").unwrap(), None);
    }

    #[test]
    fn blank_key_is_rejected() {
        let err = repo().set("  ", "v").unwrap_err();
        assert!(matches!(err, RepoError::InvalidKey(_)));
    }
}
