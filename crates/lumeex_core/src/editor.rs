//! Per-item tag input state machine.
//!
//! The editor owns only the pending input text and the suggestion list it is
//! displaying. Committed tags are handed back to the caller, which applies
//! them to the collection store and re-renders from the store's tag list.

use crate::constants::BLUR_GRACE;
use crate::tags::TagIndex;
use std::time::Instant;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditorState {
    #[default]
    Idle,
    /// Input non-empty or focused with suggestions on screen.
    Typing,
    /// A suggestion is highlighted via arrow keys or hover.
    Navigating { selected: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    Input(String),
    Focus,
    ArrowDown,
    ArrowUp,
    Hover(usize),
    Enter,
    Space,
    Comma,
    /// Focus left the input. Pending text survives until [`BLUR_GRACE`] elapses.
    Blur { at: Instant },
    /// Clock tick used to expire a pending blur.
    Tick { now: Instant },
    SuggestionClicked(usize),
    ValidateClicked,
}

#[derive(Debug, Clone, Default)]
pub struct TagEditor {
    state: EditorState,
    input: String,
    suggestions: Vec<String>,
    blurred_at: Option<Instant>,
}

impl TagEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn selected(&self) -> Option<usize> {
        match self.state {
            EditorState::Navigating { selected } => Some(selected),
            _ => None,
        }
    }

    pub fn suggestions_visible(&self) -> bool {
        self.state != EditorState::Idle
    }

    /// The validate control is shown only while there is something to commit.
    pub fn validate_visible(&self) -> bool {
        !self.input.trim().is_empty()
    }

    /// Splits a suggestion into the typed prefix and the remainder.
    pub fn highlight<'a>(&self, suggestion: &'a str) -> (&'a str, &'a str) {
        let typed = self.input.chars().count();
        let split = suggestion
            .char_indices()
            .nth(typed)
            .map_or(suggestion.len(), |(offset, _)| offset);
        suggestion.split_at(split)
    }

    /// Feeds one UI event through the state machine.
    ///
    /// `assigned` is the item's current tag list, used to hide suggestions the
    /// item already carries.
    ///
    /// # Returns
    /// `Some(tag)` when the event commits a tag.
    pub fn dispatch(
        &mut self,
        event: EditorEvent,
        index: &TagIndex,
        assigned: &[String],
    ) -> Option<String> {
        match event {
            EditorEvent::Input(text) => {
                self.input = text;
                self.blurred_at = None;
                self.refresh(index, assigned);
                None
            }
            EditorEvent::Focus => {
                self.blurred_at = None;
                self.refresh(index, assigned);
                None
            }
            EditorEvent::ArrowDown => {
                let len = self.suggestions.len();
                if len > 0 {
                    let selected = match self.state {
                        EditorState::Navigating { selected } => (selected + 1) % len,
                        _ => 0,
                    };
                    self.state = EditorState::Navigating { selected };
                }
                None
            }
            EditorEvent::ArrowUp => {
                let len = self.suggestions.len();
                if len > 0 {
                    let selected = match self.state {
                        EditorState::Navigating { selected } => (selected + len - 1) % len,
                        _ => len - 1,
                    };
                    self.state = EditorState::Navigating { selected };
                }
                None
            }
            EditorEvent::Hover(selected) => {
                if selected < self.suggestions.len() {
                    self.state = EditorState::Navigating { selected };
                }
                None
            }
            EditorEvent::Enter => {
                let chosen = self
                    .selected()
                    .and_then(|selected| self.suggestions.get(selected).cloned());
                let tag = chosen.or_else(|| self.raw_tag());
                self.reset();
                tag
            }
            EditorEvent::Space | EditorEvent::Comma => {
                let tag = self.raw_tag();
                self.reset();
                tag
            }
            EditorEvent::ValidateClicked => {
                let tag = self.raw_tag();
                if tag.is_some() {
                    self.reset();
                }
                tag
            }
            EditorEvent::Blur { at } => {
                self.blurred_at = Some(at);
                None
            }
            EditorEvent::Tick { now } => {
                if let Some(at) = self.blurred_at {
                    if now.saturating_duration_since(at) >= BLUR_GRACE {
                        self.reset();
                    }
                }
                None
            }
            EditorEvent::SuggestionClicked(position) => {
                if !self.suggestions_visible() {
                    return None;
                }
                let tag = self.suggestions.get(position).cloned();
                if tag.is_some() {
                    self.reset();
                }
                tag
            }
        }
    }

    fn raw_tag(&self) -> Option<String> {
        let trimmed = self.input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn refresh(&mut self, index: &TagIndex, assigned: &[String]) {
        self.suggestions = index.suggest(&self.input, assigned);
        self.state = if self.suggestions.is_empty() {
            EditorState::Idle
        } else {
            EditorState::Typing
        };
    }

    fn reset(&mut self) {
        self.input.clear();
        self.suggestions.clear();
        self.state = EditorState::Idle;
        self.blurred_at = None;
    }
}
