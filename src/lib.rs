//! Root crate facade for the Lumeex admin console and public-site logic.

pub use lumeex_client::{
    api, assets, console, notices, publish, queue, sections, store, AdminConsole, ApiClient,
    CollectionStore, DocumentKind, NoticeBoard, Notifier, SectionEditor, UploadFile,
};
pub use lumeex_core::{
    config, constants, delete, dirty, editor, filter, models, public, tags, validation, AppError,
    CollectionKind, Config, Item, TagIndex,
};
