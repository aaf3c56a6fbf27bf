//! Composition root wiring storage, adapter and both stores.
//!
//! # Responsibility
//! - Build exactly one persistence adapter per opened database.
//! - Hand both stores to the UI layer as one owned value.
//!
//! # Invariants
//! - Stores are loaded only after the database is migrated.
//! - Dropping the core drains pending writes.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::persistence::PersistenceAdapter;
use crate::repo::kv_repo::{KvRepository, SqliteKvRepository};
use crate::store::{MemoryStore, SettingsStore};
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug)]
pub enum AppError {
    Db(DbError),
    /// The background writer could not be started.
    Io(io::Error),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "failed to start storage writer: {err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<DbError> for AppError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<io::Error> for AppError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Both stores plus the adapter they write through.
pub struct AppCore {
    adapter: PersistenceAdapter,
    settings: SettingsStore,
    memories: MemoryStore,
}

impl AppCore {
    /// Opens (or creates) the database file at `path` and loads both stores.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        Self::with_connection(open_db(path)?)
    }

    /// Loads both stores over a throwaway in-memory database.
    pub fn open_in_memory() -> Result<Self, AppError> {
        Self::with_connection(open_db_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, AppError> {
        Self::with_repository(Arc::new(SqliteKvRepository::new(conn))).map_err(AppError::from)
    }

    /// Loads both stores over any key-value repository.
    pub fn with_repository(repo: Arc<dyn KvRepository>) -> io::Result<Self> {
        let adapter = PersistenceAdapter::new(repo)?;
        let settings = SettingsStore::load(adapter.clone());
        let memories = MemoryStore::load(adapter.clone());
        info!("event=app_open module=app status=ok");
        Ok(Self {
            adapter,
            settings,
            memories,
        })
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsStore {
        &mut self.settings
    }

    pub fn memories(&self) -> &MemoryStore {
        &self.memories
    }

    pub fn memories_mut(&mut self) -> &mut MemoryStore {
        &mut self.memories
    }

    /// Blocks until all queued writes are on disk.
    pub fn flush(&self) {
        self.adapter.flush();
    }

    /// See [`PersistenceAdapter::write_failure_count`].
    pub fn write_failure_count(&self) -> u64 {
        self.adapter.write_failure_count()
    }
}
