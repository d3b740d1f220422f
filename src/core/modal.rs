//! Modal gate placed in front of some mutations

use crate::core::record::Record;
use async_trait::async_trait;

/// What the modal is asking for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    /// Free-text feedback to attach alongside a status change
    Feedback { status: String },
    /// Yes/no confirmation before deleting
    ConfirmDelete,
}

/// What the person answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalOutcome {
    /// Proceed; carries the entered text, possibly empty
    Confirmed(String),
    /// Abort; no request may be sent
    Cancelled,
}

impl ModalOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ModalOutcome::Cancelled)
    }
}

/// Blocking, user-facing request for data required by a mutation
#[async_trait]
pub trait ActionModal: Send + Sync {
    async fn request(&self, target: &Record, action: &ActionKind) -> ModalOutcome;
}

/// Closures work as modals, which keeps tests and scripted flows short
#[async_trait]
impl<F> ActionModal for F
where
    F: Fn(&Record, &ActionKind) -> ModalOutcome + Send + Sync,
{
    async fn request(&self, target: &Record, action: &ActionKind) -> ModalOutcome {
        self(target, action)
    }
}
