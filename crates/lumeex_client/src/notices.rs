//! Admin-facing feedback: transient notices and the busy indicator.

use crossbeam_channel::{unbounded, Receiver, Sender};
use lumeex_core::constants::{NOTICE_LIMIT, NOTICE_TTL};
use lumeex_core::models::notice::{Notice, NoticeLevel};
use lumeex_core::AppError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tracing::debug;

/// Cloneable sending side handed to stores, queues and editors.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: Sender<Notice>,
}

/// Receiving side owned by the view. Keeps the notices currently on screen.
#[derive(Debug)]
pub struct NoticeBoard {
    rx: Receiver<Notice>,
    visible: VecDeque<ActiveNotice>,
}

#[derive(Debug, Clone)]
struct ActiveNotice {
    notice: Notice,
    expires_at: Instant,
}

pub fn notice_channel() -> (Notifier, NoticeBoard) {
    let (tx, rx) = unbounded();
    (
        Notifier { tx },
        NoticeBoard {
            rx,
            visible: VecDeque::new(),
        },
    )
}

impl Notifier {
    pub fn push(&self, notice: Notice) {
        debug!(level = ?notice.level, text = %notice.text, "notice");
        // The board may already be gone during shutdown.
        let _ = self.tx.send(notice);
    }

    pub fn success(&self, text: impl Into<String>) {
        self.push(Notice::success(text));
    }

    pub fn warning(&self, text: impl Into<String>) {
        self.push(Notice::warning(text));
    }

    pub fn error(&self, text: impl Into<String>) {
        self.push(Notice::error(text));
    }

    /// Reports a failed operation. Load failures are non-fatal warnings.
    pub fn report(&self, err: &AppError) {
        match err {
            AppError::Load { .. } => self.warning(err.notice_text()),
            _ => self.error(err.notice_text()),
        }
    }
}

impl NoticeBoard {
    /// Pulls newly pushed notices and drops expired ones.
    pub fn poll(&mut self, now: Instant) -> impl Iterator<Item = &Notice> {
        while let Ok(notice) = self.rx.try_recv() {
            self.insert(notice, now);
        }
        self.visible.retain(|active| active.expires_at > now);
        self.visible.iter().map(|active| &active.notice)
    }

    fn insert(&mut self, notice: Notice, now: Instant) {
        if let Some(last) = self.visible.back_mut() {
            if last.notice.text == notice.text {
                last.notice = notice;
                last.expires_at = now + NOTICE_TTL;
                return;
            }
        }
        self.visible.push_back(ActiveNotice {
            notice,
            expires_at: now + NOTICE_TTL,
        });
        while self.visible.len() > NOTICE_LIMIT {
            self.visible.pop_front();
        }
    }

    /// Takes every pending notice without display bookkeeping.
    pub fn drain(&mut self) -> Vec<Notice> {
        self.rx.try_iter().collect()
    }
}

/// Shared "operation in progress" state with a label.
#[derive(Debug, Clone, Default)]
pub struct BusyIndicator {
    state: Arc<Mutex<BusyState>>,
}

#[derive(Debug, Default)]
struct BusyState {
    next_id: u64,
    labels: Vec<(u64, String)>,
}

/// Clears its label from the indicator when dropped, whatever the outcome.
#[must_use = "the indicator is cleared as soon as the guard is dropped"]
#[derive(Debug)]
pub struct BusyGuard {
    id: u64,
    state: Arc<Mutex<BusyState>>,
}

impl BusyIndicator {
    fn lock(state: &Mutex<BusyState>) -> MutexGuard<'_, BusyState> {
        // A poisoned label list is still a valid list of strings.
        state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn begin(&self, label: impl Into<String>) -> BusyGuard {
        let mut state = Self::lock(&self.state);
        let id = state.next_id;
        state.next_id += 1;
        state.labels.push((id, label.into()));
        BusyGuard {
            id,
            state: Arc::clone(&self.state),
        }
    }

    /// Label of the most recently started operation still running.
    pub fn label(&self) -> Option<String> {
        Self::lock(&self.state)
            .labels
            .last()
            .map(|(_, label)| label.clone())
    }

    pub fn is_busy(&self) -> bool {
        !Self::lock(&self.state).labels.is_empty()
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let mut state = BusyIndicator::lock(&self.state);
        if let Some(pos) = state.labels.iter().position(|(id, _)| *id == self.id) {
            state.labels.remove(pos);
        }
    }
}
