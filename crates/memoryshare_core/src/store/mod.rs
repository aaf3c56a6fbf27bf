//! In-memory state containers mirrored to the persistence adapter.
//!
//! # Responsibility
//! - Own the settings, memory and tag collections exclusively.
//! - Apply each operation to memory first, then queue its write.
//!
//! # Invariants
//! - Reads never touch storage.
//! - The two stores never share mutable state; they only share the adapter.

mod memory_store;
mod settings_store;

pub use memory_store::{MemoryStore, TagError};
pub use settings_store::SettingsStore;
