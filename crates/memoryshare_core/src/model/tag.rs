//! Tag domain model.
//!
//! # Invariants
//! - `id` is immutable after creation.
//! - Across one tag list, names are unique case-insensitively and colors
//!   are unique exactly. The check lives in [`crate::store::MemoryStore`].

use serde::{Deserialize, Serialize};

/// Stable identifier of a tag.
pub type TagId = String;

/// Named, colored label attachable to memories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    /// Display color, usually a `#RRGGBB` hex string.
    pub color: String,
}

impl Tag {
    /// Creates a tag with a caller-provided id (seed data, imports).
    pub fn with_id(
        id: impl Into<TagId>,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }

    /// Case-insensitive name comparison used by uniqueness checks.
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}
