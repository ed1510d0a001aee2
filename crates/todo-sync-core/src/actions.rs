//! Reconciliation actions.
//!
//! Each action sends one request, waits for the resulting job with the
//! [`JobPoller`], and only then changes the [`ItemStore`]. Per-item actions
//! hold an [`OperationGuard`] for their whole run, so the tracker entry is
//! released on success, on error and when the action future is dropped.

use crate::api::TodoApi;
use crate::error::{SyncError, SyncResult};
use crate::fetch_gate::FetchGate;
use crate::models::Item;
use crate::poller::{JobPoller, PollPolicy};
use crate::store::ItemStore;
use crate::tracker::{OperationKind, OperationTracker};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Fetch always asks for the first page, sized to hold the whole list.
pub const FETCH_PAGE: u32 = 1;

/// Largest `limit` the service accepts.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Trimmed title, or a validation error when nothing is left.
pub fn validate_title(title: &str) -> SyncResult<&str> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(SyncError::Validation("title cannot be empty".to_string()));
    }
    Ok(trimmed)
}

/// Entry point for driving the todo list.
///
/// Cloning is cheap and clones share the store, tracker and fetch ordering,
/// so a clone can be moved into a spawned task.
#[derive(Clone)]
pub struct TodoSync {
    api: Arc<dyn TodoApi>,
    store: ItemStore,
    tracker: OperationTracker,
    poller: JobPoller,
    fetch_gate: Arc<FetchGate>,
    page_limit: u32,
}

impl TodoSync {
    /// Build from explicit parts; callers that render state keep their own
    /// clones of `store` and `tracker`.
    pub fn new(
        api: Arc<dyn TodoApi>,
        store: ItemStore,
        tracker: OperationTracker,
        poll_policy: PollPolicy,
    ) -> Self {
        Self {
            poller: JobPoller::new(api.clone(), poll_policy),
            api,
            store,
            tracker,
            fetch_gate: Arc::new(FetchGate::new()),
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Fresh store and tracker with the default poll policy.
    pub fn with_api(api: Arc<dyn TodoApi>) -> Self {
        Self::new(
            api,
            ItemStore::new(),
            OperationTracker::new(),
            PollPolicy::default(),
        )
    }

    /// Page size for fetch, clamped to what the service accepts.
    pub fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit.clamp(1, DEFAULT_PAGE_LIMIT);
        self
    }

    pub fn store(&self) -> &ItemStore {
        &self.store
    }

    pub fn tracker(&self) -> &OperationTracker {
        &self.tracker
    }

    pub fn poll_policy(&self) -> &PollPolicy {
        self.poller.policy()
    }

    pub fn items(&self) -> Vec<Item> {
        self.store.list()
    }

    pub fn remaining_count(&self) -> usize {
        self.store.remaining_count()
    }

    pub fn is_active(&self, kind: OperationKind, id: &str) -> bool {
        self.tracker.is_active(kind, id)
    }

    /// Replace the local list with the service's first page.
    ///
    /// A response overtaken by a newer fetch is discarded.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> SyncResult<()> {
        let ticket = self.fetch_gate.issue();
        let items = match self.api.list_todos(FETCH_PAGE, self.page_limit).await {
            Ok(items) => items,
            Err(e) => {
                self.fetch_gate.forget(ticket);
                return Err(e);
            }
        };

        match self.fetch_gate.admit(ticket, items) {
            Some(items) => {
                debug!(count = items.len(), ticket = ticket.sequence(), "Applying fetch");
                self.store.replace_all(items);
            }
            None => {
                debug!(ticket = ticket.sequence(), "Discarding stale fetch");
            }
        }
        Ok(())
    }

    /// Create a todo and re-fetch once the job completes.
    pub async fn create(&self, title: &str) -> SyncResult<()> {
        let policy = *self.poller.policy();
        self.create_with_policy(title, &policy).await
    }

    #[instrument(skip(self, policy))]
    pub async fn create_with_policy(&self, title: &str, policy: &PollPolicy) -> SyncResult<()> {
        let title = validate_title(title)?;

        let job = self.api.create_todo(title).await?;
        self.poller.await_job_with(&job.id, policy).await?;

        info!(job_id = %job.id, "Todo created");
        // The new id is only known to the service.
        self.fetch().await
    }

    /// Flip `completed` for `id` once the service confirms it.
    pub async fn toggle(&self, id: &str) -> SyncResult<()> {
        let policy = *self.poller.policy();
        self.toggle_with_policy(id, &policy).await
    }

    #[instrument(skip(self, policy))]
    pub async fn toggle_with_policy(&self, id: &str, policy: &PollPolicy) -> SyncResult<()> {
        let _guard = self.tracker.acquire(OperationKind::Toggle, id)?;

        let job = self.api.toggle_todo(id).await?;
        self.poller.await_job_with(&job.id, policy).await?;

        self.store.patch_one(id, |item| item.completed = !item.completed);
        info!(todo_id = %id, job_id = %job.id, "Todo toggled");
        Ok(())
    }

    /// Remove `id` once the service confirms the deletion.
    pub async fn delete(&self, id: &str) -> SyncResult<()> {
        let policy = *self.poller.policy();
        self.delete_with_policy(id, &policy).await
    }

    #[instrument(skip(self, policy))]
    pub async fn delete_with_policy(&self, id: &str, policy: &PollPolicy) -> SyncResult<()> {
        let _guard = self.tracker.acquire(OperationKind::Delete, id)?;

        let job = self.api.delete_todo(id).await?;
        self.poller.await_job_with(&job.id, policy).await?;

        self.fetch_gate.record_removal(id);
        self.store.remove_one(id);
        info!(todo_id = %id, job_id = %job.id, "Todo deleted");
        Ok(())
    }

    /// Re-read one todo and overwrite the local copy if there is one.
    ///
    /// Items missing locally are not inserted; that is fetch's job.
    #[instrument(skip(self))]
    pub async fn refresh_one(&self, id: &str) -> SyncResult<Item> {
        let fresh = self.api.get_todo(id).await?;
        let replacement = fresh.clone();
        let patched = self.store.patch_one(id, move |item| *item = replacement);
        debug!(todo_id = %id, patched, "Refreshed todo");
        Ok(fresh)
    }
}
