//! Frequency-ranked tag index derived from a collection.
//!
//! The index is never cached: callers rebuild it from the current items at
//! every lookup so it can not drift from the collection it describes.

use crate::models::item::Item;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Distinct tags ordered by descending occurrence count.
///
/// Ties keep the order in which the tags were first seen while walking items
/// in collection order and tags in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagIndex {
    entries: Vec<TagCount>,
}

impl TagIndex {
    pub fn from_items(items: &[Item]) -> Self {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut entries: Vec<TagCount> = Vec::new();
        for tag in items.iter().flat_map(|item| item.tags()) {
            match positions.get(tag.as_str()) {
                Some(&pos) => entries[pos].count += 1,
                None => {
                    positions.insert(tag.as_str(), entries.len());
                    entries.push(TagCount {
                        tag: tag.clone(),
                        count: 1,
                    });
                }
            }
        }
        // `sort_by` is stable, which is what keeps first-seen order on ties.
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        Self { entries }
    }

    pub fn entries(&self) -> &[TagCount] {
        &self.entries
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.tag.as_str())
    }

    pub fn count(&self, tag: &str) -> usize {
        self.entries
            .iter()
            .find(|entry| entry.tag == tag)
            .map_or(0, |entry| entry.count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tags whose lowercase form starts with the lowercase `prefix`, skipping
    /// those already in `assigned`, in index order.
    ///
    /// The prefix is not trimmed; an empty prefix yields every eligible tag.
    pub fn suggest(&self, prefix: &str, assigned: &[String]) -> Vec<String> {
        let prefix = prefix.to_lowercase();
        self.tags()
            .filter(|tag| tag.to_lowercase().starts_with(&prefix))
            .filter(|tag| !assigned.iter().any(|a| a == tag))
            .map(str::to_string)
            .collect()
    }
}
