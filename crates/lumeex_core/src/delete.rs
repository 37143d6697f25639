//! Destructive actions waiting for the admin's confirmation.

use crate::models::item::CollectionKind;

pub const SINGLE_DELETE_PROMPT: &str = "Are you sure you want to delete this image?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget {
    /// One item, by its index in the collection store.
    Item(usize),
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDelete {
    pub kind: CollectionKind,
    pub target: DeleteTarget,
}

impl PendingDelete {
    pub fn item(kind: CollectionKind, index: usize) -> Self {
        Self {
            kind,
            target: DeleteTarget::Item(index),
        }
    }

    pub fn all(kind: CollectionKind) -> Self {
        Self {
            kind,
            target: DeleteTarget::All,
        }
    }

    pub fn prompt(&self) -> &'static str {
        match self.target {
            DeleteTarget::Item(_) => SINGLE_DELETE_PROMPT,
            DeleteTarget::All => self.kind.delete_all_prompt(),
        }
    }
}

/// Confirmation dialog holding at most one pending delete.
#[derive(Debug, Clone, Default)]
pub struct DeleteModal {
    pending: Option<PendingDelete>,
}

impl DeleteModal {
    /// Opens the dialog, replacing any earlier unconfirmed request.
    pub fn request(&mut self, pending: PendingDelete) -> &'static str {
        self.pending = Some(pending);
        pending.prompt()
    }

    pub fn pending(&self) -> Option<PendingDelete> {
        self.pending
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Closes the dialog and hands back what was confirmed.
    pub fn confirm(&mut self) -> Option<PendingDelete> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_depend_on_target() {
        assert_eq!(
            PendingDelete::item(CollectionKind::Hero, 2).prompt(),
            SINGLE_DELETE_PROMPT
        );
        assert_eq!(
            PendingDelete::all(CollectionKind::Gallery).prompt(),
            "Are you sure you want to delete ALL gallery images?"
        );
        assert_eq!(
            PendingDelete::all(CollectionKind::Hero).prompt(),
            "Are you sure you want to delete ALL hero images?"
        );
    }

    #[test]
    fn confirm_and_cancel_both_clear_the_modal() {
        let mut modal = DeleteModal::default();
        modal.request(PendingDelete::item(CollectionKind::Gallery, 0));
        modal.request(PendingDelete::item(CollectionKind::Gallery, 3));
        assert_eq!(
            modal.confirm(),
            Some(PendingDelete::item(CollectionKind::Gallery, 3))
        );
        assert!(!modal.is_open());
        assert_eq!(modal.confirm(), None);

        modal.request(PendingDelete::all(CollectionKind::Hero));
        modal.cancel();
        assert_eq!(modal.pending(), None);
    }
}
