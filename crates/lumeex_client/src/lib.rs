//! Async admin client for a Lumeex backend: HTTP gateway, write queues,
//! collection stores, section editors and asset management.

/// Typed HTTP gateway over the admin API.
pub mod api;
/// Theme folders and local fonts.
pub mod assets;
/// Component wiring for one backend.
pub mod console;
/// Notices and busy indicator.
pub mod notices;
/// Static build and archive download.
pub mod publish;
/// Per-collection ordered write queue.
pub mod queue;
/// Site-info and theme section editors.
pub mod sections;
/// Collection stores.
pub mod store;

pub use api::{ApiClient, BuildReport, StatusResponse, UploadFile};
pub use assets::ThemeAssets;
pub use console::{AdminConsole, DeleteOutcome};
pub use notices::{notice_channel, BusyIndicator, NoticeBoard, Notifier};
pub use publish::Publisher;
pub use queue::SyncQueue;
pub use sections::{DocumentKind, SectionEditor};
pub use store::{CollectionStore, ItemRow};
