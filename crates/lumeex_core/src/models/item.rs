//! Collection items and the two collection kinds.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// One photo entry in the gallery or hero collection.
///
/// `tags` stays `None` when the server sent no tag field so a load/save
/// round-trip reproduces the original document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Item {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            tags: None,
        }
    }

    pub fn with_tags<I, S>(src: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            src: src.into(),
            tags: Some(tags.into_iter().map(Into::into).collect()),
        }
    }

    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or(&[])
    }

    pub fn is_untagged(&self) -> bool {
        self.tags().is_empty()
    }

    /// Exact, case-sensitive membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|t| t == tag)
    }

    /// Case-insensitive membership used by the public filter.
    pub fn has_tag_ignore_case(&self, tag: &str) -> bool {
        let wanted = tag.to_lowercase();
        self.tags().iter().any(|t| t.to_lowercase() == wanted)
    }

    /// Appends `tag` unless already present. Returns whether the list changed.
    pub fn insert_tag(&mut self, tag: &str) -> bool {
        if self.has_tag(tag) {
            return false;
        }
        self.tags.get_or_insert_with(Vec::new).push(tag.to_string());
        true
    }

    /// Removes `tag` if present. Returns whether the list changed.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let Some(tags) = self.tags.as_mut() else {
            return false;
        };
        let before = tags.len();
        tags.retain(|t| t != tag);
        tags.len() != before
    }

    /// Last path segment of `src`, which is what the delete endpoint expects.
    pub fn filename(&self) -> &str {
        self.src
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.src.as_str())
    }
}

/// `src` values that appear more than once, in first-seen order.
pub fn duplicate_sources(items: &[Item]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();
    for item in items {
        if !seen.insert(item.src.as_str()) && reported.insert(item.src.as_str()) {
            duplicates.push(item.src.as_str());
        }
    }
    duplicates
}

/// The two photo collections managed by the admin console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Gallery,
    Hero,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 2] = [CollectionKind::Gallery, CollectionKind::Hero];

    /// Path segment used under `/api/`.
    pub fn api_segment(self) -> &'static str {
        match self {
            Self::Gallery => "gallery",
            Self::Hero => "hero",
        }
    }

    /// Capitalized name for notices (`Gallery`).
    pub fn title(self) -> &'static str {
        match self {
            Self::Gallery => "Gallery",
            Self::Hero => "Hero",
        }
    }

    /// Only gallery items carry tags.
    pub fn supports_tags(self) -> bool {
        matches!(self, Self::Gallery)
    }

    pub fn delete_all_prompt(self) -> &'static str {
        match self {
            Self::Gallery => "Are you sure you want to delete ALL gallery images?",
            Self::Hero => "Are you sure you want to delete ALL hero images?",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_segment())
    }
}
