//! Per-item bookkeeping of in-flight operations.
//!
//! The tracker itself is plain set membership. Release on every exit path is
//! provided by [`OperationGuard`], which reconciliation actions hold for the
//! whole request/poll/commit sequence.

use crate::error::{SyncError, SyncResult};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Per-item operation kinds that are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Toggle,
    Delete,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Toggle => "toggle",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ids with an in-flight toggle and ids with an in-flight delete.
///
/// The two sets are independent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerState {
    toggling: HashSet<String>,
    deleting: HashSet<String>,
}

impl TrackerState {
    pub fn ids(&self, kind: OperationKind) -> &HashSet<String> {
        match kind {
            OperationKind::Toggle => &self.toggling,
            OperationKind::Delete => &self.deleting,
        }
    }

    fn ids_mut(&mut self, kind: OperationKind) -> &mut HashSet<String> {
        match kind {
            OperationKind::Toggle => &mut self.toggling,
            OperationKind::Delete => &mut self.deleting,
        }
    }

    pub fn toggling_ids(&self) -> &HashSet<String> {
        &self.toggling
    }

    pub fn deleting_ids(&self) -> &HashSet<String> {
        &self.deleting
    }

    pub fn contains(&self, kind: OperationKind, id: &str) -> bool {
        self.ids(kind).contains(id)
    }

    pub fn is_idle(&self) -> bool {
        self.toggling.is_empty() && self.deleting.is_empty()
    }
}

/// Shared, observable operation tracker.
#[derive(Clone)]
pub struct OperationTracker {
    state: Arc<watch::Sender<TrackerState>>,
}

impl Default for OperationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationTracker {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(TrackerState::default());
        Self {
            state: Arc::new(sender),
        }
    }

    /// Mark `id` as having an in-flight `kind` operation.
    ///
    /// Idempotent: returns false when the pair was already active.
    pub fn begin(&self, kind: OperationKind, id: &str) -> bool {
        self.state.send_if_modified(|state| state.ids_mut(kind).insert(id.to_string()))
    }

    /// Clear the `kind` mark for `id`. Idempotent.
    pub fn end(&self, kind: OperationKind, id: &str) -> bool {
        self.state.send_if_modified(|state| state.ids_mut(kind).remove(id))
    }

    pub fn is_active(&self, kind: OperationKind, id: &str) -> bool {
        self.state.borrow().contains(kind, id)
    }

    pub fn snapshot(&self) -> TrackerState {
        self.state.borrow().clone()
    }

    /// Receiver notified whenever an entry is added or removed.
    pub fn subscribe(&self) -> watch::Receiver<TrackerState> {
        self.state.subscribe()
    }

    /// Begin `kind` for `id` and return a guard that ends it when dropped.
    ///
    /// Fails with `AlreadyInFlight` when the pair is already active; the
    /// existing entry is left untouched.
    pub fn acquire(&self, kind: OperationKind, id: &str) -> SyncResult<OperationGuard> {
        if !self.begin(kind, id) {
            debug!(kind = %kind, todo_id = %id, "Rejecting duplicate operation");
            return Err(SyncError::AlreadyInFlight {
                kind,
                id: id.to_string(),
            });
        }

        Ok(OperationGuard {
            tracker: self.clone(),
            kind,
            id: id.to_string(),
        })
    }
}

/// Scoped tracker entry; ends the operation exactly once when dropped.
#[must_use = "the operation is released as soon as the guard is dropped"]
pub struct OperationGuard {
    tracker: OperationTracker,
    kind: OperationKind,
    id: String,
}

impl OperationGuard {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        self.tracker.end(self.kind, &self.id);
    }
}

impl fmt::Debug for OperationGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationGuard")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish()
    }
}
