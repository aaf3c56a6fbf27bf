//! Core domain logic for MemoryShare.
//! This crate is the single source of truth for memory/tag invariants and
//! owns every byte written to local storage.

pub mod app;
pub mod db;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod repo;
pub mod search;
pub mod store;

pub use app::{AppCore, AppError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::memory::{Location, Memory, MemoryDraft, MemoryDraftError, MemoryId};
pub use model::settings::{Language, ThemeMode};
pub use model::tag::{Tag, TagId};
pub use persistence::PersistenceAdapter;
pub use repo::kv_repo::{KvRepository, RepoError, RepoResult, SqliteKvRepository};
pub use search::filter::{count_created_in_month, filter_memories, MemoryQuery};
pub use search::map::{initial_region, map_markers, MapMarker, MapRegion};
pub use store::{MemoryStore, SettingsStore, TagError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
