//! Wiring of every admin component around one backend.

use crate::api::ApiClient;
use crate::assets::ThemeAssets;
use crate::notices::{notice_channel, BusyIndicator, NoticeBoard, Notifier};
use crate::publish::{preview_url, Publisher};
use crate::queue::SyncQueue;
use crate::sections::{DocumentKind, SectionEditor};
use crate::store::CollectionStore;
use lumeex_core::config::Config;
use lumeex_core::delete::{DeleteModal, DeleteTarget, PendingDelete};
use lumeex_core::{AppError, CollectionKind};
use std::sync::Arc;
use tracing::info;

/// What a confirmed delete did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The dialog was not open.
    Nothing,
    Item { kind: CollectionKind, src: String },
    All { kind: CollectionKind },
}

#[derive(Debug)]
pub struct AdminConsole {
    config: Config,
    api: Arc<ApiClient>,
    notifier: Notifier,
    notices: NoticeBoard,
    busy: BusyIndicator,
    pub gallery: CollectionStore,
    pub hero: CollectionStore,
    pub site_info: SectionEditor,
    pub theme: SectionEditor,
    pub assets: ThemeAssets,
    pub publisher: Publisher,
    delete_modal: DeleteModal,
}

impl AdminConsole {
    /// Builds the console and starts one write queue per collection.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let api = Arc::new(ApiClient::from_config(&config)?);
        let (notifier, notices) = notice_channel();
        let busy = BusyIndicator::default();

        let store = |kind| {
            let queue = SyncQueue::start(kind, Arc::clone(&api), notifier.clone());
            CollectionStore::new(queue, notifier.clone(), busy.clone())
        };
        let gallery = store(CollectionKind::Gallery);
        let hero = store(CollectionKind::Hero);

        let editor =
            |kind| SectionEditor::new(kind, Arc::clone(&api), notifier.clone(), busy.clone());
        let site_info = editor(DocumentKind::SiteInfo);
        let theme = editor(DocumentKind::Theme);

        let assets = ThemeAssets::new(Arc::clone(&api), notifier.clone(), busy.clone());
        let publisher = Publisher::new(Arc::clone(&api), notifier.clone(), busy.clone());

        info!(server = api.server(), "admin console ready");
        Ok(Self {
            config,
            api,
            notifier,
            notices,
            busy,
            gallery,
            hero,
            site_info,
            theme,
            assets,
            publisher,
            delete_modal: DeleteModal::default(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn notices(&mut self) -> &mut NoticeBoard {
        &mut self.notices
    }

    pub fn busy(&self) -> &BusyIndicator {
        &self.busy
    }

    pub fn preview_url(&self) -> String {
        preview_url(self.api.server(), self.config.preview_port)
    }

    pub fn store(&self, kind: CollectionKind) -> &CollectionStore {
        match kind {
            CollectionKind::Gallery => &self.gallery,
            CollectionKind::Hero => &self.hero,
        }
    }

    pub fn store_mut(&mut self, kind: CollectionKind) -> &mut CollectionStore {
        match kind {
            CollectionKind::Gallery => &mut self.gallery,
            CollectionKind::Hero => &mut self.hero,
        }
    }

    /// Loads both collections. A failing collection keeps its previous items.
    pub async fn load_collections(&mut self) -> Result<(), AppError> {
        let gallery = self.gallery.load().await;
        let hero = self.hero.load().await;
        gallery.and(hero)
    }

    /// Opens the confirmation dialog and returns its prompt.
    pub fn request_delete(&mut self, pending: PendingDelete) -> &'static str {
        self.delete_modal.request(pending)
    }

    pub fn pending_delete(&self) -> Option<PendingDelete> {
        self.delete_modal.pending()
    }

    pub fn cancel_delete(&mut self) {
        self.delete_modal.cancel();
    }

    /// Runs the confirmed delete. The dialog is closed whatever the outcome.
    pub async fn confirm_delete(&mut self) -> Result<DeleteOutcome, AppError> {
        let Some(pending) = self.delete_modal.confirm() else {
            return Ok(DeleteOutcome::Nothing);
        };
        let store = self.store_mut(pending.kind);
        match pending.target {
            DeleteTarget::Item(index) => {
                let removed = store.delete_item(index).await?;
                Ok(DeleteOutcome::Item {
                    kind: pending.kind,
                    src: removed.src,
                })
            }
            DeleteTarget::All => {
                store.delete_all().await?;
                Ok(DeleteOutcome::All { kind: pending.kind })
            }
        }
    }

    /// Waits for every queued collection write.
    pub async fn flush(&self) -> Result<(), AppError> {
        self.gallery.flush().await?;
        self.hero.flush().await
    }
}
