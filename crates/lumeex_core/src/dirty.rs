//! Section dirty-state tracking for the site-info and theme editors.
//!
//! A document (site info or theme) is split into sections. Each section has a
//! `current` value edited by the form and is compared against the matching
//! slice of the last authoritative document fetched from the server.

use crate::error::AppError;
use crate::models::theme::FontFallback;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Static description of one editable section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSchema {
    /// Name used by the UI and CLI (`google-fonts`).
    pub name: &'static str,
    /// Top-level key in the document (`google_fonts`).
    pub key: &'static str,
    /// Dotted field paths compared for dirtiness. Empty compares the whole value.
    pub fields: &'static [&'static str],
    /// Dotted field paths that must be non-empty.
    pub required: &'static [&'static str],
    /// For list sections, fields every entry must fill in.
    pub item_required: &'static [&'static str],
    /// Font fallback fields, coerced to `serif` or `sans-serif`.
    pub fallback_fields: &'static [&'static str],
}

pub const THEME_SECTIONS: &[SectionSchema] = &[
    SectionSchema {
        name: "colors",
        key: "colors",
        fields: &[
            "primary",
            "primary_dark",
            "secondary",
            "accent",
            "text_dark",
            "background",
            "browser_color",
        ],
        required: &[
            "primary",
            "primary_dark",
            "secondary",
            "accent",
            "text_dark",
            "background",
            "browser_color",
        ],
        item_required: &[],
        fallback_fields: &[],
    },
    SectionSchema {
        name: "google-fonts",
        key: "google_fonts",
        fields: &[],
        required: &[],
        item_required: &["family"],
        fallback_fields: &[],
    },
    SectionSchema {
        name: "fonts",
        key: "fonts",
        fields: &[
            "primary.name",
            "primary.fallback",
            "secondary.name",
            "secondary.fallback",
        ],
        required: &[
            "primary.name",
            "primary.fallback",
            "secondary.name",
            "secondary.fallback",
        ],
        item_required: &[],
        fallback_fields: &["primary.fallback", "secondary.fallback"],
    },
    SectionSchema {
        name: "favicon",
        key: "favicon",
        fields: &["path"],
        required: &["path"],
        item_required: &[],
        fallback_fields: &[],
    },
];

pub const SITE_INFO_SECTIONS: &[SectionSchema] = &[
    SectionSchema {
        name: "info",
        key: "info",
        fields: &[
            "title",
            "subtitle",
            "description",
            "canonical",
            "keywords",
            "author",
        ],
        required: &["title", "description"],
        item_required: &[],
        fallback_fields: &[],
    },
    SectionSchema {
        name: "social",
        key: "social",
        fields: &["instagram_url", "thumbnail"],
        required: &[],
        item_required: &[],
        fallback_fields: &[],
    },
    SectionSchema {
        name: "menu",
        key: "menu",
        fields: &["items"],
        required: &[],
        item_required: &[],
        fallback_fields: &[],
    },
    SectionSchema {
        name: "footer",
        key: "footer",
        fields: &["copyright", "legal_label"],
        required: &[],
        item_required: &[],
        fallback_fields: &[],
    },
    SectionSchema {
        name: "legals",
        key: "legals",
        fields: &[
            "hoster_name",
            "hoster_adress",
            "hoster_contact",
            "intellectual_property",
        ],
        required: &[],
        item_required: &[],
        fallback_fields: &[],
    },
    SectionSchema {
        name: "build",
        key: "build",
        fields: &["theme", "convert_images", "resize_images"],
        required: &[],
        item_required: &[],
        fallback_fields: &[],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionStatus {
    Incomplete,
    Unsaved,
    Saved,
}

impl SectionStatus {
    /// Status line shown next to the section, empty when saved.
    pub fn message(self) -> &'static str {
        match self {
            Self::Incomplete => "⚠️ Section not yet saved. Please fill required fields",
            Self::Unsaved => "⚠️ Section not yet saved",
            Self::Saved => "",
        }
    }
}

/// Looks up a dotted path (`primary.name`) inside a JSON value.
pub fn value_at<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(root, |value, segment| value.as_object()?.get(segment))
}

fn set_value_at(root: &mut Value, path: &str, new_value: Value) {
    let mut cursor = root;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        if !cursor.is_object() {
            *cursor = Value::Object(Map::new());
        }
        let Value::Object(map) = cursor else {
            return;
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), new_value);
            return;
        }
        cursor = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(b) => !b,
        Value::Number(_) => false,
    }
}

fn is_filled(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Null) | None => false,
        Some(other) => !is_empty_value(other),
    }
}

/// Raw equality where an absent or null side matches an empty value.
fn values_match(current: Option<&Value>, loaded: Option<&Value>) -> bool {
    let current = current.filter(|v| !v.is_null());
    let loaded = loaded.filter(|v| !v.is_null());
    match (current, loaded) {
        (Some(c), Some(l)) => c == l,
        (Some(v), None) | (None, Some(v)) => is_empty_value(v),
        (None, None) => true,
    }
}

impl SectionSchema {
    pub fn is_complete(&self, current: &Value) -> bool {
        let fields_ok = self
            .required
            .iter()
            .all(|path| is_filled(value_at(current, path)));
        let items_ok = match current.as_array() {
            Some(entries) if !self.item_required.is_empty() => entries.iter().all(|entry| {
                self.item_required
                    .iter()
                    .all(|path| is_filled(value_at(entry, path)))
            }),
            _ => true,
        };
        fields_ok && items_ok
    }

    pub fn matches_loaded(&self, current: &Value, loaded: Option<&Value>) -> bool {
        if self.fields.is_empty() {
            return values_match(Some(current), loaded);
        }
        self.fields.iter().all(|path| {
            values_match(
                value_at(current, path),
                loaded.and_then(|section| value_at(section, path)),
            )
        })
    }

    /// Coerces the font fallback fields of an object section in place.
    pub fn normalize(&self, current: &mut Value) {
        if !current.is_object() {
            return;
        }
        for path in self.fallback_fields {
            let raw = value_at(current, path)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let normalized = FontFallback::normalize(&raw).as_str();
            if raw != normalized {
                debug!(
                    section = self.name,
                    path,
                    from = %raw,
                    to = normalized,
                    "fallback normalized"
                );
                set_value_at(current, path, Value::String(normalized.to_string()));
            }
        }
    }

    pub fn status(&self, current: &Value, loaded: Option<&Value>) -> SectionStatus {
        if !self.is_complete(current) {
            SectionStatus::Incomplete
        } else if self.matches_loaded(current, loaded) {
            SectionStatus::Saved
        } else {
            SectionStatus::Unsaved
        }
    }
}

#[derive(Debug, Clone)]
struct SectionState {
    schema: &'static SectionSchema,
    current: Value,
    status: SectionStatus,
}

/// Current form values of every section of one document plus the last
/// authoritative copy of the full document.
#[derive(Debug, Clone)]
pub struct DocumentSections {
    loaded: Value,
    sections: Vec<SectionState>,
}

impl DocumentSections {
    /// Starts tracking with every section's form initialized from `loaded`.
    pub fn new(schemas: &'static [SectionSchema], loaded: Value) -> Self {
        let sections = schemas
            .iter()
            .map(|schema| {
                let mut current = loaded.get(schema.key).cloned().unwrap_or(Value::Null);
                schema.normalize(&mut current);
                let status = schema.status(&current, loaded.get(schema.key));
                SectionState {
                    schema,
                    current,
                    status,
                }
            })
            .collect();
        Self { loaded, sections }
    }

    pub fn loaded(&self) -> &Value {
        &self.loaded
    }

    pub fn section_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.sections.iter().map(|state| state.schema.name)
    }

    fn state(&self, section: &str) -> Result<&SectionState, AppError> {
        self.sections
            .iter()
            .find(|state| state.schema.name == section)
            .ok_or_else(|| AppError::validation(format!("Unknown section: {}", section)))
    }

    fn state_mut(&mut self, section: &str) -> Result<&mut SectionState, AppError> {
        self.sections
            .iter_mut()
            .find(|state| state.schema.name == section)
            .ok_or_else(|| AppError::validation(format!("Unknown section: {}", section)))
    }

    pub fn status(&self, section: &str) -> Result<SectionStatus, AppError> {
        self.state(section).map(|state| state.status)
    }

    pub fn statuses(&self) -> Vec<(&'static str, SectionStatus)> {
        self.sections
            .iter()
            .map(|state| (state.schema.name, state.status))
            .collect()
    }

    pub fn current(&self, section: &str) -> Result<&Value, AppError> {
        self.state(section).map(|state| &state.current)
    }

    /// Updates one field of a section's form and recomputes its status.
    ///
    /// An empty `path` replaces the whole section value.
    pub fn set_field(
        &mut self,
        section: &str,
        path: &str,
        value: Value,
    ) -> Result<SectionStatus, AppError> {
        let loaded = self.loaded.clone();
        let state = self.state_mut(section)?;
        if path.is_empty() {
            state.current = value;
        } else {
            set_value_at(&mut state.current, path, value);
        }
        state.schema.normalize(&mut state.current);
        state.status = state
            .schema
            .status(&state.current, loaded.get(state.schema.key));
        Ok(state.status)
    }

    pub fn set_section(&mut self, section: &str, value: Value) -> Result<SectionStatus, AppError> {
        self.set_field(section, "", value)
    }

    /// The full document to POST when saving `section`: the last loaded
    /// document with that section replaced by its form value.
    ///
    /// Fails with a validation error when the section is incomplete.
    pub fn merged_payload(&self, section: &str) -> Result<Value, AppError> {
        let state = self.state(section)?;
        if state.status == SectionStatus::Incomplete {
            return Err(AppError::validation(
                "❌ Please fill all required fields before saving.",
            ));
        }
        let mut payload = match &self.loaded {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        payload.insert(state.schema.key.to_string(), state.current.clone());
        Ok(Value::Object(payload))
    }

    /// Replaces the authoritative document, keeping form values, and
    /// recomputes every status.
    pub fn replace_loaded(&mut self, loaded: Value) {
        for state in &mut self.sections {
            state.status = state
                .schema
                .status(&state.current, loaded.get(state.schema.key));
        }
        self.loaded = loaded;
    }

    /// Replaces both the document and the form values of every section.
    pub fn reset(&mut self, loaded: Value) {
        for state in &mut self.sections {
            state.current = loaded.get(state.schema.key).cloned().unwrap_or(Value::Null);
            state.schema.normalize(&mut state.current);
            state.status = state
                .schema
                .status(&state.current, loaded.get(state.schema.key));
        }
        self.loaded = loaded;
    }

    /// Replaces one section's form value with what the server holds.
    pub fn reset_section(&mut self, section: &str) -> Result<SectionStatus, AppError> {
        let loaded = self.loaded.clone();
        let state = self.state_mut(section)?;
        state.current = loaded.get(state.schema.key).cloned().unwrap_or(Value::Null);
        state.schema.normalize(&mut state.current);
        state.status = state
            .schema
            .status(&state.current, loaded.get(state.schema.key));
        Ok(state.status)
    }
}
