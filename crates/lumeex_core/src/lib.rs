//! Core domain library for the Lumeex admin console (models, tags, filters, section tracking).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Pending destructive actions awaiting confirmation.
pub mod delete;
/// Section dirty-state tracking for site-info and theme forms.
pub mod dirty;
/// Tag input state machine.
pub mod editor;
/// Application error types.
pub mod error;
/// Gallery view projections and URL filter state.
pub mod filter;
/// Data models for API payloads.
pub mod models;
/// Public-site helpers (hero rotation, shuffle).
pub mod public;
/// Tag frequency index and suggestions.
pub mod tags;
/// Upload and form field validation.
pub mod validation;

pub use config::Config;
pub use constants::*;
pub use error::AppError;
pub use models::item::{CollectionKind, Item};
pub use tags::TagIndex;
