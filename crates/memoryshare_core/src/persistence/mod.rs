//! Persistence adapter between the stores and durable key-value storage.
//!
//! # Responsibility
//! - Give stores a `get`/`set` boundary that never fails loudly.
//! - Apply writes off the caller's path, in submission order.
//!
//! # Invariants
//! - Read failures degrade to "absent".
//! - All writes go through one FIFO writer thread, so two writes to the same
//!   key are applied in the order they were issued.
//! - A write failure is logged and counted, never returned to the caller.

mod writer;

pub use writer::PersistenceAdapter;

/// Persisted key for the memory collection.
pub const MEMORIES_KEY: &str = "@memoryshare/memories";
/// Persisted key for the tag collection.
pub const TAGS_KEY: &str = "@memoryshare/tags";
/// Persisted key for the display language code.
pub const LANGUAGE_KEY: &str = "@memoryshare/lang";
/// Persisted key for the theme mode.
pub const THEME_KEY: &str = "@memoryshare/theme";
