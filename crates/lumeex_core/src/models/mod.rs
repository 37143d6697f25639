//! Data models for API requests and persisted documents.

/// Gallery and hero collection items.
pub mod item;
/// Transient admin notices.
pub mod notice;
/// Site information document (`site.yaml`).
pub mod site;
/// Theme document (`theme.yaml`) and asset listings.
pub mod theme;
