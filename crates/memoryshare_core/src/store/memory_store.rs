//! Memory and tag store.
//!
//! # Responsibility
//! - Own the memory list (newest first) and the tag list.
//! - Enforce tag uniqueness and cascade tag deletion into memories.
//! - Seed sample data on first launch.
//!
//! # Invariants
//! - No two tags share a name (case-insensitive) or a color (exact).
//! - Every tag reference held by a memory points at an existing tag.
//! - A rejected operation leaves both collections untouched.

use crate::model::memory::{Location, Memory, MemoryDraft, MemoryId};
use crate::model::new_id;
use crate::model::tag::{Tag, TagId};
use crate::persistence::{PersistenceAdapter, MEMORIES_KEY, TAGS_KEY};
use crate::search::filter::{count_created_in_month, filter_memories, MemoryQuery};
use chrono::{DateTime, Datelike, Utc};
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejection from `add_tag` / `edit_tag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    /// Another tag already uses this name (compared case-insensitively).
    NameConflict { name: String, existing_id: TagId },
    /// Another tag already uses this exact color.
    ColorConflict { color: String, existing_id: TagId },
    /// `edit_tag` target does not exist.
    NotFound(TagId),
}

impl Display for TagError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameConflict { name, existing_id } => {
                write!(f, "tag name `{name}` is already used by tag {existing_id}")
            }
            Self::ColorConflict { color, existing_id } => {
                write!(f, "tag color `{color}` is already used by tag {existing_id}")
            }
            Self::NotFound(id) => write!(f, "tag not found: {id}"),
        }
    }
}

impl Error for TagError {}

enum StoredCollection<T> {
    Present(Vec<T>),
    Absent,
    Malformed,
}

/// Owner of the memory and tag collections.
pub struct MemoryStore {
    adapter: PersistenceAdapter,
    memories: Vec<Memory>,
    tags: Vec<Tag>,
}

impl MemoryStore {
    /// Restores both collections independently.
    ///
    /// An absent key is seeded with sample data and the seed is written back.
    /// A malformed payload falls back to the same sample data for that
    /// collection only and is left on disk until the next mutation.
    pub fn load(adapter: PersistenceAdapter) -> Self {
        let tags = match read_collection::<Tag>(&adapter, TAGS_KEY) {
            StoredCollection::Present(tags) => tags,
            StoredCollection::Absent => {
                let seed = default_tags();
                write_collection(&adapter, TAGS_KEY, &seed);
                seed
            }
            StoredCollection::Malformed => default_tags(),
        };

        let memories = match read_collection::<Memory>(&adapter, MEMORIES_KEY) {
            StoredCollection::Present(memories) => memories,
            StoredCollection::Absent => {
                let seed = seed_memories(&tags, Utc::now());
                write_collection(&adapter, MEMORIES_KEY, &seed);
                seed
            }
            StoredCollection::Malformed => seed_memories(&tags, Utc::now()),
        };

        info!(
            "event=memories_load module=store status=ok memory_count={} tag_count={}",
            memories.len(),
            tags.len()
        );
        Self {
            adapter,
            memories,
            tags,
        }
    }

    /// Memories, newest first.
    pub fn memories(&self) -> &[Memory] {
        &self.memories
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn get_memory_by_id(&self, id: &str) -> Option<&Memory> {
        self.memories.iter().find(|memory| memory.id == id)
    }

    pub fn get_tag_by_id(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.id == id)
    }

    /// Resolves a memory's tag references, in tag-list order.
    ///
    /// Returns `None` when the memory does not exist.
    pub fn tags_for_memory(&self, id: &str) -> Option<Vec<&Tag>> {
        let memory = self.get_memory_by_id(id)?;
        Some(
            self.tags
                .iter()
                .filter(|tag| memory.has_tag(&tag.id))
                .collect(),
        )
    }

    /// Memories matching `query`, newest first.
    pub fn search(&self, query: &MemoryQuery) -> Vec<&Memory> {
        filter_memories(&self.memories, query)
    }

    /// Number of memories created in the calendar month (UTC) of `now`.
    pub fn count_this_month(&self, now: DateTime<Utc>) -> usize {
        count_created_in_month(&self.memories, now.year(), now.month())
    }

    pub fn count_current_month(&self) -> usize {
        self.count_this_month(Utc::now())
    }

    /// Creates a memory and puts it first in the list.
    ///
    /// Title and image are not checked here (see [`MemoryDraft::validate`]).
    /// Tag references are de-duplicated and unknown tag ids are dropped.
    pub fn add_memory(&mut self, draft: MemoryDraft) -> Memory {
        let requested = draft.tags.len();
        let mut seen = HashSet::new();
        let tags: Vec<TagId> = draft
            .tags
            .into_iter()
            .filter(|id| self.tags.iter().any(|tag| &tag.id == id))
            .filter(|id| seen.insert(id.clone()))
            .collect();
        if tags.len() != requested {
            warn!(
                "event=memory_add module=store status=normalized requested_tags={} kept_tags={}",
                requested,
                tags.len()
            );
        }

        let memory = Memory {
            id: self.fresh_memory_id(),
            title: draft.title,
            description: draft.description,
            image_uri: draft.image_uri,
            tags,
            location: draft.location,
            created_at: Utc::now(),
        };
        self.memories.insert(0, memory.clone());
        self.persist_memories();

        info!(
            "event=memory_add module=store status=ok memory_id={} memory_count={}",
            memory.id,
            self.memories.len()
        );
        memory
    }

    /// Creates a tag after checking name/color uniqueness.
    pub fn add_tag(
        &mut self,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<Tag, TagError> {
        let name = name.into();
        let color = color.into();
        if let Err(err) = check_unique(&self.tags, &name, &color, None) {
            warn!("event=tag_add module=store status=rejected error={}", err);
            return Err(err);
        }

        let tag = Tag::with_id(self.fresh_tag_id(), name, color);
        self.tags.push(tag.clone());
        self.persist_tags();

        info!(
            "event=tag_add module=store status=ok tag_id={} tag_count={}",
            tag.id,
            self.tags.len()
        );
        Ok(tag)
    }

    /// Renames/recolors a tag in place. The tag's own current values never
    /// count as a conflict.
    pub fn edit_tag(
        &mut self,
        id: &str,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<Tag, TagError> {
        let name = name.into();
        let color = color.into();
        let Some(index) = self.tags.iter().position(|tag| tag.id == id) else {
            return Err(TagError::NotFound(id.to_string()));
        };
        if let Err(err) = check_unique(&self.tags, &name, &color, Some(id)) {
            warn!(
                "event=tag_edit module=store status=rejected tag_id={} error={}",
                id, err
            );
            return Err(err);
        }

        let tag = &mut self.tags[index];
        tag.name = name;
        tag.color = color;
        let updated = tag.clone();
        self.persist_tags();

        info!("event=tag_edit module=store status=ok tag_id={}", id);
        Ok(updated)
    }

    /// Removes a tag and every reference to it.
    ///
    /// Returns `false` (and writes nothing) when the tag does not exist.
    pub fn delete_tag(&mut self, id: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|tag| tag.id != id);
        if self.tags.len() == before {
            return false;
        }

        let mut detached = 0usize;
        for memory in &mut self.memories {
            let held = memory.tags.len();
            memory.tags.retain(|tag_id| tag_id != id);
            detached += held - memory.tags.len();
        }

        self.persist_tags();
        self.persist_memories();
        info!(
            "event=tag_delete module=store status=ok tag_id={} detached_refs={}",
            id, detached
        );
        true
    }

    fn fresh_memory_id(&self) -> MemoryId {
        loop {
            let id = new_id();
            if self.get_memory_by_id(&id).is_none() {
                return id;
            }
        }
    }

    fn fresh_tag_id(&self) -> TagId {
        loop {
            let id = new_id();
            if self.get_tag_by_id(&id).is_none() {
                return id;
            }
        }
    }

    fn persist_memories(&self) {
        write_collection(&self.adapter, MEMORIES_KEY, &self.memories);
    }

    fn persist_tags(&self) {
        write_collection(&self.adapter, TAGS_KEY, &self.tags);
    }
}

/// First conflict wins; a tag clashing on both reports its name.
fn check_unique(
    tags: &[Tag],
    name: &str,
    color: &str,
    ignore_id: Option<&str>,
) -> Result<(), TagError> {
    for existing in tags {
        if ignore_id == Some(existing.id.as_str()) {
            continue;
        }
        if existing.name_matches(name) {
            return Err(TagError::NameConflict {
                name: name.to_string(),
                existing_id: existing.id.clone(),
            });
        }
        if existing.color == color {
            return Err(TagError::ColorConflict {
                color: color.to_string(),
                existing_id: existing.id.clone(),
            });
        }
    }
    Ok(())
}

fn read_collection<T: DeserializeOwned>(
    adapter: &PersistenceAdapter,
    key: &str,
) -> StoredCollection<T> {
    let Some(raw) = adapter.get(key) else {
        info!(
            "event=collection_load module=store status=seeded key={}",
            key
        );
        return StoredCollection::Absent;
    };
    match serde_json::from_str::<Vec<T>>(&raw) {
        Ok(items) => StoredCollection::Present(items),
        Err(err) => {
            warn!(
                "event=collection_load module=store status=fallback key={} error_code=malformed_payload error={}",
                key, err
            );
            StoredCollection::Malformed
        }
    }
}

fn write_collection<T: Serialize>(adapter: &PersistenceAdapter, key: &str, items: &[T]) {
    match serde_json::to_string(items) {
        Ok(json) => adapter.set(key, json),
        Err(err) => error!(
            "event=collection_write module=store status=error key={} error={}",
            key, err
        ),
    }
}

/// Sample memories restricted to tag ids present in `tags`.
fn seed_memories(tags: &[Tag], created_at: DateTime<Utc>) -> Vec<Memory> {
    let mut seed = default_memories(created_at);
    for memory in &mut seed {
        memory.tags.retain(|id| tags.iter().any(|tag| &tag.id == id));
    }
    seed
}

/// Sample tags written on first launch.
pub(crate) fn default_tags() -> Vec<Tag> {
    vec![
        Tag::with_id("family", "Family", "#1E90FF"),
        Tag::with_id("vacation", "Vacation", "#FF69B4"),
        Tag::with_id("friends", "Friends", "#32CD32"),
    ]
}

/// Sample memory written on first launch.
pub(crate) fn default_memories(created_at: DateTime<Utc>) -> Vec<Memory> {
    vec![Memory {
        id: "1".to_string(),
        title: "Trip to Trondheim".to_string(),
        description: Some("Walk along Nidelva with friends.".to_string()),
        image_uri: "https://placekitten.com/300/300".to_string(),
        tags: vec!["vacation".to_string(), "friends".to_string()],
        location: Location::new(63.4305, 10.3951),
        created_at,
    }]
}

#[cfg(test)]
mod tests {
    use super::{check_unique, default_tags, seed_memories, TagError};
    use crate::model::tag::Tag;
    use chrono::Utc;

    #[test]
    fn check_unique_reports_name_before_color() {
        let tags = default_tags();
        let err = check_unique(&tags, "FAMILY", "#1E90FF", None).unwrap_err();
        assert_eq!(
            err,
            TagError::NameConflict {
                name: "FAMILY".to_string(),
                existing_id: "family".to_string(),
            }
        );
    }

    #[test]
    fn check_unique_skips_ignored_id() {
        let tags = default_tags();
        assert!(check_unique(&tags, "family", "#1E90FF", Some("family")).is_ok());
        let err = check_unique(&tags, "Family", "#FF69B4", Some("family")).unwrap_err();
        assert!(matches!(err, TagError::ColorConflict { ref existing_id, .. } if existing_id == "vacation"));
    }

    #[test]
    fn color_comparison_is_exact() {
        let tags = default_tags();
        assert!(check_unique(&tags, "Work", "#1e90ff", None).is_ok());
    }

    #[test]
    fn seed_memory_keeps_only_existing_tag_references() {
        let tags = vec![
            Tag::with_id("family", "Family", "#1E90FF"),
            Tag::with_id("friends", "Friends", "#32CD32"),
        ];
        let seed = seed_memories(&tags, Utc::now());
        assert_eq!(seed[0].tags, vec!["friends".to_string()]);
    }
}
