//! Linear filters over memories.

use crate::model::memory::Memory;
use crate::model::tag::TagId;
use chrono::Datelike;

/// Filter options for the memory list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryQuery {
    /// Case-insensitive substring matched against title and description.
    /// Empty matches everything.
    pub text: String,
    /// Optional tag reference every result must carry.
    pub tag_id: Option<TagId>,
}

impl MemoryQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag_id: None,
        }
    }

    pub fn with_tag(mut self, tag_id: impl Into<TagId>) -> Self {
        self.tag_id = Some(tag_id.into());
        self
    }
}

/// Returns the memories matching `query`, in input order.
pub fn filter_memories<'a>(memories: &'a [Memory], query: &MemoryQuery) -> Vec<&'a Memory> {
    let needle = query.text.to_lowercase();
    memories
        .iter()
        .filter(|memory| matches_text(memory, &needle))
        .filter(|memory| {
            query
                .tag_id
                .as_deref()
                .map_or(true, |tag_id| memory.has_tag(tag_id))
        })
        .collect()
}

/// Counts memories whose `created_at` (UTC) falls in `year`/`month`.
pub fn count_created_in_month(memories: &[Memory], year: i32, month: u32) -> usize {
    memories
        .iter()
        .filter(|memory| memory.created_at.year() == year && memory.created_at.month() == month)
        .count()
}

fn matches_text(memory: &Memory, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    memory.title.to_lowercase().contains(needle)
        || memory
            .description
            .as_deref()
            .unwrap_or("")
            .to_lowercase()
            .contains(needle)
}

#[cfg(test)]
mod tests {
    use super::{count_created_in_month, filter_memories, MemoryQuery};
    use crate::model::memory::{Location, Memory};
    use chrono::{TimeZone, Utc};

    fn memory(id: &str, title: &str, description: Option<&str>, tags: &[&str]) -> Memory {
        Memory {
            id: id.to_string(),
            title: title.to_string(),
            description: description.map(str::to_string),
            image_uri: "file:///img.jpg".to_string(),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            location: Location::new(0.0, 0.0),
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap(),
        }
    }

    fn ids(hits: Vec<&Memory>) -> Vec<&str> {
        hits.into_iter().map(|memory| memory.id.as_str()).collect()
    }

    #[test]
    fn text_matches_title_or_description_ignoring_case() {
        let memories = vec![
            memory("a", "Trip to Trondheim", None, &[]),
            memory("b", "Dinner", Some("with TRONDHEIM friends"), &[]),
            memory("c", "Hike", Some("mountains"), &[]),
        ];
        let hits = filter_memories(&memories, &MemoryQuery::new("trondheim"));
        assert_eq!(ids(hits), vec!["a", "b"]);
    }

    #[test]
    fn empty_text_returns_everything() {
        let memories = vec![memory("a", "One", None, &[]), memory("b", "Two", None, &[])];
        assert_eq!(filter_memories(&memories, &MemoryQuery::default()).len(), 2);
    }

    #[test]
    fn tag_filter_combines_with_text() {
        let memories = vec![
            memory("a", "Beach day", None, &["vacation"]),
            memory("b", "Beach cleanup", None, &["friends"]),
            memory("c", "Museum", None, &["vacation"]),
        ];
        let query = MemoryQuery::new("beach").with_tag("vacation");
        assert_eq!(ids(filter_memories(&memories, &query)), vec!["a"]);
    }

    #[test]
    fn month_count_checks_year_and_month() {
        let mut other_year = memory("b", "Old", None, &[]);
        other_year.created_at = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let memories = vec![memory("a", "New", None, &[]), other_year];
        assert_eq!(count_created_in_month(&memories, 2026, 3), 1);
        assert_eq!(count_created_in_month(&memories, 2026, 4), 0);
    }
}
