//! Job-polling reconciliation engine for a todo list.
//!
//! The remote service answers every mutation with a job handle. This crate
//! provides:
//! - ItemStore: observable in-memory list, only changed after confirmation
//! - OperationTracker: which items have a toggle or delete in flight
//! - JobPoller: waits for a job to complete, fail or exhaust its poll policy
//! - TodoSync: the fetch/create/toggle/delete actions tying them together
//! - HttpTodoApi: reqwest client for the service's HTTP contract

mod actions;
mod api;
mod error;
mod fetch_gate;
mod http_client;
mod models;
mod poller;
mod store;
mod tracker;

pub use actions::{validate_title, TodoSync, DEFAULT_PAGE_LIMIT, FETCH_PAGE};
pub use api::TodoApi;
pub use error::{SyncError, SyncResult};
pub use fetch_gate::{FetchGate, FetchTicket};
pub use http_client::{HttpClientConfig, HttpTodoApi};
pub use models::{Item, JobHandle, JobStatus};
pub use poller::{JobPoller, PollPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL};
pub use store::ItemStore;
pub use tracker::{OperationGuard, OperationKind, OperationTracker, TrackerState};
