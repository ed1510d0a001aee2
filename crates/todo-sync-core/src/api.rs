//! The remote todo service contract.

use crate::error::SyncResult;
use crate::models::{Item, JobHandle};
use async_trait::async_trait;

/// Remote operations the reconciliation engine relies on.
///
/// Mutating calls return a [`JobHandle`]; the mutation is only trusted once
/// [`TodoApi::job_status`] reports the job as completed.
#[async_trait]
pub trait TodoApi: Send + Sync {
    /// `GET /todos?page={page}&limit={limit}`
    async fn list_todos(&self, page: u32, limit: u32) -> SyncResult<Vec<Item>>;

    /// `GET /todos/{id}`
    async fn get_todo(&self, id: &str) -> SyncResult<Item>;

    /// `POST /todos` with `{title}`
    async fn create_todo(&self, title: &str) -> SyncResult<JobHandle>;

    /// `POST /todos/{id}/toggle`
    async fn toggle_todo(&self, id: &str) -> SyncResult<JobHandle>;

    /// `DELETE /todos/{id}`
    async fn delete_todo(&self, id: &str) -> SyncResult<JobHandle>;

    /// `GET /jobs/{job_id}`
    async fn job_status(&self, job_id: &str) -> SyncResult<JobHandle>;
}
