//! Per-collection write queue.
//!
//! Each collection save sends the entire item list, so two saves completing
//! out of order would silently revert the newer edit. Every backend call for
//! one collection therefore goes through a single task that executes
//! requests strictly one at a time, in the order they were enqueued.

use crate::api::{ApiClient, StatusResponse, UploadFile};
use crate::notices::Notifier;
use lumeex_core::models::item::{CollectionKind, Item};
use lumeex_core::AppError;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

#[derive(Debug)]
pub enum SyncRequest {
    Load,
    /// Overwrite the server copy with this snapshot of the collection.
    Save(Vec<Item>),
    Delete { filename: String },
    DeleteAll,
    Refresh,
    Upload(Vec<UploadFile>),
    /// Resolves once everything enqueued before it has completed.
    Barrier,
}

impl SyncRequest {
    fn label(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Save(_) => "save",
            Self::Delete { .. } => "delete",
            Self::DeleteAll => "delete_all",
            Self::Refresh => "refresh",
            Self::Upload(_) => "upload",
            Self::Barrier => "barrier",
        }
    }
}

#[derive(Debug)]
pub enum SyncReply {
    Items(Vec<Item>),
    Ack(StatusResponse),
    Done,
}

type ReplyTx = oneshot::Sender<Result<SyncReply, AppError>>;

struct QueueMessage {
    request: SyncRequest,
    /// `None` for fire-and-forget writes; failures then surface as notices.
    reply: Option<ReplyTx>,
}

/// Handle to the write queue of one collection.
#[derive(Debug, Clone)]
pub struct SyncQueue {
    kind: CollectionKind,
    sender: mpsc::UnboundedSender<QueueMessage>,
}

impl std::fmt::Debug for QueueMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueMessage")
            .field("request", &self.request.label())
            .field("awaited", &self.reply.is_some())
            .finish()
    }
}

impl SyncQueue {
    /// Spawns the queue task on the current tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn start(kind: CollectionKind, api: Arc<ApiClient>, notifier: Notifier) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<QueueMessage>();

        tokio::spawn(async move {
            while let Some(message) = receiver.recv().await {
                let label = message.request.label();
                debug!(collection = %kind, request = label, "sync request started");
                let result = execute(&api, kind, message.request).await;
                match message.reply {
                    Some(reply) => {
                        let _ = reply.send(result);
                    }
                    None => {
                        if let Err(err) = result {
                            error!(
                                collection = %kind,
                                request = label,
                                error = %err,
                                "background sync failed"
                            );
                            notifier.report(&err);
                        }
                    }
                }
            }
            debug!(collection = %kind, "sync queue closed");
        });

        Self { kind, sender }
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    fn closed(&self) -> AppError {
        AppError::Transport(format!("{} sync queue is unavailable", self.kind))
    }

    /// Enqueues a request without waiting for it.
    pub fn enqueue(&self, request: SyncRequest) -> Result<(), AppError> {
        self.sender
            .send(QueueMessage {
                request,
                reply: None,
            })
            .map_err(|_| self.closed())
    }

    /// Enqueues a request and waits for its own result.
    pub async fn send(&self, request: SyncRequest) -> Result<SyncReply, AppError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(QueueMessage {
                request,
                reply: Some(reply_tx),
            })
            .map_err(|_| self.closed())?;
        reply_rx.await.map_err(|_| self.closed())?
    }

    /// Waits until every request enqueued so far has been executed.
    pub async fn flush(&self) -> Result<(), AppError> {
        self.send(SyncRequest::Barrier).await.map(drop)
    }
}

async fn execute(
    api: &ApiClient,
    kind: CollectionKind,
    request: SyncRequest,
) -> Result<SyncReply, AppError> {
    match request {
        SyncRequest::Load => api.list(kind).await.map(SyncReply::Items),
        SyncRequest::Save(items) => api.update(kind, &items).await.map(|_| SyncReply::Done),
        SyncRequest::Delete { filename } => {
            api.delete(kind, &filename).await.map(|_| SyncReply::Done)
        }
        SyncRequest::DeleteAll => api.delete_all(kind).await.map(SyncReply::Ack),
        SyncRequest::Refresh => api.refresh(kind).await.map(|_| SyncReply::Done),
        SyncRequest::Upload(files) => api.upload(kind, files).await.map(SyncReply::Ack),
        SyncRequest::Barrier => Ok(SyncReply::Done),
    }
}
