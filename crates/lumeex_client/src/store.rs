//! Authoritative in-memory copy of one collection (gallery or hero).
//!
//! The store is the single source of truth for the admin view. Tag edits are
//! applied locally right away and persisted in the background through the
//! collection's [`SyncQueue`]. Destructive operations only touch local state
//! after the server has confirmed them.

use crate::api::UploadFile;
use crate::notices::{BusyIndicator, Notifier};
use crate::queue::{SyncQueue, SyncReply, SyncRequest};
use lumeex_core::editor::{EditorEvent, TagEditor};
use lumeex_core::filter::AdminFilter;
use lumeex_core::models::item::{duplicate_sources, CollectionKind, Item};
use lumeex_core::validation::ensure_photo_file;
use lumeex_core::{AppError, TagIndex};
use tracing::{info, warn};

/// One rendered row of the admin editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    /// Index in the store, whatever filter produced the row.
    pub index: usize,
    pub src: String,
    pub tags: Vec<String>,
}

#[derive(Debug)]
pub struct CollectionStore {
    kind: CollectionKind,
    items: Vec<Item>,
    queue: SyncQueue,
    notifier: Notifier,
    busy: BusyIndicator,
}

impl CollectionStore {
    pub fn new(queue: SyncQueue, notifier: Notifier, busy: BusyIndicator) -> Self {
        Self {
            kind: queue.kind(),
            items: Vec::new(),
            queue,
            notifier,
            busy,
        }
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Store index of the item with this `src`.
    pub fn position(&self, src: &str) -> Option<usize> {
        self.items.iter().position(|item| item.src == src)
    }

    fn check_index(&self, index: usize) -> Result<(), AppError> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "No {} item at index {} (collection has {})",
                self.kind,
                index,
                self.items.len()
            )))
        }
    }

    fn check_taggable(&self) -> Result<(), AppError> {
        if self.kind.supports_tags() {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "{} items do not carry tags",
                self.kind.title()
            )))
        }
    }

    /// Replaces the collection with the server copy.
    ///
    /// On failure the previous items are kept and a warning notice is shown.
    pub async fn load(&mut self) -> Result<(), AppError> {
        match self.queue.send(SyncRequest::Load).await {
            Ok(SyncReply::Items(items)) => {
                let duplicates = duplicate_sources(&items);
                if !duplicates.is_empty() {
                    warn!(
                        collection = %self.kind,
                        ?duplicates,
                        "server returned duplicate sources"
                    );
                }
                info!(collection = %self.kind, count = items.len(), "collection loaded");
                self.items = items;
                Ok(())
            }
            Ok(other) => {
                let err = AppError::load("images", format!("unexpected reply {:?}", other));
                self.notifier.report(&err);
                Err(err)
            }
            Err(err) => {
                let err = match err {
                    AppError::Load { .. } => err,
                    other => AppError::load("images", other),
                };
                self.notifier.report(&err);
                Err(err)
            }
        }
    }

    /// Adds `tag` to the item at `index` and schedules a save.
    ///
    /// # Returns
    /// `Ok(false)` without scheduling anything when the tag is already present.
    pub fn add_tag(&mut self, index: usize, tag: &str) -> Result<bool, AppError> {
        self.check_taggable()?;
        self.check_index(index)?;
        let tag = tag.trim();
        if tag.is_empty() || !self.items[index].insert_tag(tag) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Removes `tag` from the item at `index` and schedules a save.
    pub fn remove_tag(&mut self, index: usize, tag: &str) -> Result<bool, AppError> {
        self.check_taggable()?;
        self.check_index(index)?;
        if !self.items[index].remove_tag(tag) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Feeds an editor event for the item at `index`, committing any tag it yields.
    pub fn dispatch_editor(
        &mut self,
        index: usize,
        editor: &mut TagEditor,
        event: EditorEvent,
    ) -> Result<Option<String>, AppError> {
        self.check_index(index)?;
        let tag_index = self.tag_index();
        let committed = editor.dispatch(event, &tag_index, self.items[index].tags());
        if let Some(tag) = &committed {
            self.add_tag(index, tag)?;
        }
        Ok(committed)
    }

    /// Schedules a full overwrite of the server copy, ordered after every
    /// earlier write to this collection.
    pub fn save(&self) -> Result<(), AppError> {
        self.queue.enqueue(SyncRequest::Save(self.items.clone()))
    }

    /// Saves and waits for the server to acknowledge.
    pub async fn save_now(&self) -> Result<(), AppError> {
        let result = self
            .queue
            .send(SyncRequest::Save(self.items.clone()))
            .await
            .map(drop);
        if let Err(err) = &result {
            self.notifier.report(err);
        }
        result
    }

    /// Waits for every write scheduled so far.
    pub async fn flush(&self) -> Result<(), AppError> {
        self.queue.flush().await
    }

    /// Deletes the stored photo of the item at `index`.
    ///
    /// The item is removed locally, and the collection saved, only once the
    /// server has confirmed the delete.
    pub async fn delete_item(&mut self, index: usize) -> Result<Item, AppError> {
        self.check_index(index)?;
        let filename = self.items[index].filename().to_string();
        let result = self
            .queue
            .send(SyncRequest::Delete {
                filename: filename.clone(),
            })
            .await;
        if let Err(err) = result {
            warn!(collection = %self.kind, %filename, error = %err, "delete failed");
            self.notifier.report(&err);
            return Err(err);
        }
        let removed = self.items.remove(index);
        self.save()?;
        self.notifier
            .success(format!("✅ {} image deleted!", self.kind.title()));
        Ok(removed)
    }

    /// Deletes every stored photo of the collection.
    pub async fn delete_all(&mut self) -> Result<(), AppError> {
        if let Err(err) = self.queue.send(SyncRequest::DeleteAll).await {
            self.notifier.report(&err);
            return Err(err);
        }
        self.items.clear();
        self.save()?;
        self.notifier.success(format!(
            "✅ All {} images removed!",
            self.kind.api_segment()
        ));
        Ok(())
    }

    /// Asks the server to rescan its photo folder, then reloads.
    pub async fn refresh_from_folder(&mut self) -> Result<(), AppError> {
        if let Err(err) = self.queue.send(SyncRequest::Refresh).await {
            self.notifier.report(&err);
            return Err(err);
        }
        self.load().await?;
        self.notifier.success(format!(
            "🔄 {} updated from photos/{} folder",
            self.kind.title(),
            self.kind.api_segment()
        ));
        Ok(())
    }

    /// Uploads photos, then refreshes from the folder.
    ///
    /// # Returns
    /// How many files the server reported as uploaded.
    pub async fn upload(&mut self, files: Vec<UploadFile>) -> Result<usize, AppError> {
        if files.is_empty() {
            return Ok(0);
        }
        for file in &files {
            if let Err(err) = ensure_photo_file(&file.name) {
                self.notifier.report(&err);
                return Err(err);
            }
        }
        let label = match self.kind {
            CollectionKind::Gallery => "Uploading photos...",
            CollectionKind::Hero => "Uploading hero photos...",
        };
        let uploaded = {
            let _busy = self.busy.begin(label);
            match self.queue.send(SyncRequest::Upload(files)).await {
                Ok(SyncReply::Ack(ack)) => ack.uploaded.len(),
                Ok(_) => 0,
                Err(err) => {
                    self.notifier.report(&err);
                    return Err(err);
                }
            }
        };
        self.notifier.success(format!(
            "✅ {} {} image(s) uploaded!",
            uploaded,
            self.kind.api_segment()
        ));
        self.refresh_from_folder().await?;
        Ok(uploaded)
    }

    /// Tag frequency index, rebuilt from the current items.
    pub fn tag_index(&self) -> TagIndex {
        TagIndex::from_items(&self.items)
    }

    /// Suggestions for the item at `index` given the typed `prefix`.
    pub fn suggestions(&self, index: usize, prefix: &str) -> Result<Vec<String>, AppError> {
        self.check_index(index)?;
        Ok(self.tag_index().suggest(prefix, self.items[index].tags()))
    }

    /// Store indices shown by the admin editor under `filter`.
    pub fn visible_indices(&self, filter: AdminFilter) -> Vec<usize> {
        filter.visible_indices(&self.items)
    }

    pub fn untagged_indices(&self) -> Vec<usize> {
        self.visible_indices(AdminFilter {
            untagged_only: true,
        })
    }

    /// Rows to render under `filter`, computed from current state only.
    pub fn rows(&self, filter: AdminFilter) -> Vec<ItemRow> {
        self.visible_indices(filter)
            .into_iter()
            .map(|index| ItemRow {
                index,
                src: self.items[index].src.clone(),
                tags: self.items[index].tags().to_vec(),
            })
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn replace_items(&mut self, items: Vec<Item>) {
        self.items = items;
    }
}
