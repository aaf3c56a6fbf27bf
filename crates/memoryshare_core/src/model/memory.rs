//! Memory domain model.
//!
//! # Responsibility
//! - Define the user-created memory record and its creation input.
//! - Provide the caller-side required-field check for drafts.
//!
//! # Invariants
//! - `id` and `created_at` are set exactly once, by the store.
//! - `tags` holds tag ids; membership is what matters, order is display only.

use super::tag::TagId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier of a memory.
pub type MemoryId = String;

/// Latitude/longitude pair in floating point degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Persisted memory record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub id: MemoryId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Local or remote image reference.
    pub image_uri: String,
    #[serde(default)]
    pub tags: Vec<TagId>,
    pub location: Location,
    /// RFC 3339 on the wire.
    pub created_at: DateTime<Utc>,
}

impl Memory {
    /// Returns whether `tag_id` is among this memory's tag references.
    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|id| id == tag_id)
    }
}

/// Input for creating a memory: every field except `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryDraft {
    pub title: String,
    pub description: Option<String>,
    pub image_uri: String,
    pub tags: Vec<TagId>,
    pub location: Location,
}

impl MemoryDraft {
    pub fn new(title: impl Into<String>, image_uri: impl Into<String>, location: Location) -> Self {
        Self {
            title: title.into(),
            description: None,
            image_uri: image_uri.into(),
            tags: Vec::new(),
            location,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TagId>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Checks the fields a create form must fill before saving.
    ///
    /// `MemoryStore::add_memory` does not call this; it is offered to the
    /// UI layer, which owns the "missing data" prompt.
    pub fn validate(&self) -> Result<(), MemoryDraftError> {
        if self.title.trim().is_empty() {
            return Err(MemoryDraftError::MissingTitle);
        }
        if self.image_uri.trim().is_empty() {
            return Err(MemoryDraftError::MissingImage);
        }
        Ok(())
    }
}

/// Required-field failures for [`MemoryDraft::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryDraftError {
    MissingTitle,
    MissingImage,
}

impl Display for MemoryDraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "memory title is required"),
            Self::MissingImage => write!(f, "memory image is required"),
        }
    }
}

impl Error for MemoryDraftError {}
