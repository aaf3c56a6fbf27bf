//! Domain model for memories, tags and display settings.
//!
//! # Responsibility
//! - Define the records owned by the stores and their JSON wire shape.
//!
//! # Invariants
//! - Identifiers are opaque strings, generated once and never reused.
//! - Persisted JSON uses camelCase field names.

pub mod memory;
pub mod settings;
pub mod tag;

use uuid::Uuid;

/// Generates a fresh opaque identifier (UUID v4, hyphenated).
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
