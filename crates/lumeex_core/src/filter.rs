//! Pure view projections over a collection.
//!
//! The public gallery narrows items by an AND filter of lowercase tags and
//! moves the item matching the last clicked tag to the front. The admin
//! editor can narrow to untagged items. Neither projection mutates items;
//! both return store indices so edits made through a filtered view land on
//! the right item.

use crate::config::FilterOptions;
use crate::constants::TAG_QUERY_KEY;
use crate::models::item::Item;

/// Normalizes the text of a clicked tag element (`#Beach` -> `beach`).
pub fn normalize_tag_text(text: &str) -> String {
    text.trim().replacen('#', "", 1).trim().to_lowercase()
}

/// Active public-site tag filter, mirrored into the `?tag=` query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveFilter {
    tags: Vec<String>,
    last_clicked_tag: Option<String>,
}

impl ActiveFilter {
    /// Seeds the filter from the decoded value of the `tag` query parameter.
    ///
    /// The last listed tag counts as the last clicked one.
    pub fn from_tag_param(value: Option<&str>) -> Self {
        let tags: Vec<String> = value
            .unwrap_or_default()
            .split(',')
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();
        let last_clicked_tag = tags.last().cloned();
        Self {
            tags,
            last_clicked_tag,
        }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn last_clicked_tag(&self) -> Option<&str> {
        self.last_clicked_tag.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn is_active(&self, tag_text: &str) -> bool {
        let tag = normalize_tag_text(tag_text);
        self.tags.iter().any(|t| *t == tag)
    }

    /// Toggles a clicked tag and remembers it as the last clicked one.
    pub fn toggle(&mut self, tag_text: &str) {
        let tag = normalize_tag_text(tag_text);
        if tag.is_empty() {
            return;
        }
        if let Some(pos) = self.tags.iter().position(|t| *t == tag) {
            self.tags.remove(pos);
        } else {
            self.tags.push(tag.clone());
        }
        self.last_clicked_tag = Some(tag);
    }

    /// AND semantics: every active tag must be on the item.
    pub fn matches(&self, item: &Item) -> bool {
        self.tags.iter().all(|tag| item.has_tag_ignore_case(tag))
    }

    /// `?tag=a,b`, or an empty string when no tag is active.
    pub fn query_string(&self) -> String {
        if self.tags.is_empty() {
            String::new()
        } else {
            format!("?{}={}", TAG_QUERY_KEY, self.tags.join(","))
        }
    }
}

/// Result of applying a filter: what to show plus the side effects the view
/// should perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Store indices of visible items, in display order.
    pub visible: Vec<usize>,
    pub last_clicked_section: Option<usize>,
    /// Replacement for the page query string.
    pub query: String,
    pub scroll_into_view: bool,
}

/// Display order of the public gallery.
///
/// `base` is the order the page was rendered in (after the load-time
/// shuffle). `display` is the current on-screen order and only ever changes
/// by moving the last clicked section to the front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryView {
    base: Vec<usize>,
    display: Vec<usize>,
    options: FilterOptions,
}

impl GalleryView {
    pub fn new(len: usize, options: FilterOptions) -> Self {
        Self::with_order((0..len).collect(), options)
    }

    pub fn with_order(order: Vec<usize>, options: FilterOptions) -> Self {
        Self {
            display: order.clone(),
            base: order,
            options,
        }
    }

    pub fn display_order(&self) -> &[usize] {
        &self.display
    }

    /// Applies the filter after a tag click.
    pub fn apply(&mut self, items: &[Item], filter: &ActiveFilter) -> FilterOutcome {
        self.project(items, filter, true, true)
    }

    /// Applies a filter seeded from the URL on page load.
    ///
    /// Nothing happens for an empty filter; otherwise scrolling and
    /// reordering follow [`FilterOptions`].
    pub fn apply_initial(&mut self, items: &[Item], filter: &ActiveFilter) -> FilterOutcome {
        if filter.is_empty() {
            return FilterOutcome {
                visible: self.display.clone(),
                last_clicked_section: None,
                query: String::new(),
                scroll_into_view: false,
            };
        }
        let FilterOptions {
            reorder_on_initial_load,
            scroll_on_initial_load,
        } = self.options;
        self.project(items, filter, reorder_on_initial_load, scroll_on_initial_load)
    }

    fn project(
        &mut self,
        items: &[Item],
        filter: &ActiveFilter,
        reorder: bool,
        scroll: bool,
    ) -> FilterOutcome {
        let is_visible =
            |index: usize| items.get(index).is_some_and(|item| filter.matches(item));

        let last_clicked_section = filter.last_clicked_tag().and_then(|tag| {
            self.base.iter().copied().find(|&index| {
                is_visible(index) && items[index].has_tag_ignore_case(tag)
            })
        });

        if reorder {
            if let Some(section) = last_clicked_section {
                if let Some(pos) = self.display.iter().position(|&i| i == section) {
                    let moved = self.display.remove(pos);
                    self.display.insert(0, moved);
                }
            }
        }

        FilterOutcome {
            visible: self
                .display
                .iter()
                .copied()
                .filter(|&index| is_visible(index))
                .collect(),
            // Only a section that was actually moved is reported.
            last_clicked_section: last_clicked_section.filter(|_| reorder),
            query: filter.query_string(),
            scroll_into_view: scroll,
        }
    }
}

/// Admin editor projection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminFilter {
    pub untagged_only: bool,
}

impl AdminFilter {
    /// Store indices of the rows to render.
    pub fn visible_indices(&self, items: &[Item]) -> Vec<usize> {
        items
            .iter()
            .enumerate()
            .filter(|(_, item)| !self.untagged_only || item.is_untagged())
            .map(|(index, _)| index)
            .collect()
    }
}
