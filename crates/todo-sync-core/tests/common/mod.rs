//! In-memory stand-in for the todo service.
//!
//! Mutations are accepted as pending jobs. A job's effect is applied to the
//! server-side list the first time its status is reported as completed, and
//! discarded when it is reported as failed, mirroring the real worker.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use todo_sync_core::{Item, JobHandle, JobStatus, SyncError, SyncResult, TodoApi};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List { page: u32, limit: u32 },
    Get(String),
    Create(String),
    Toggle(String),
    Delete(String),
    JobStatus(String),
}

#[derive(Debug, Clone)]
enum Effect {
    Create(String),
    Toggle(String),
    Delete(String),
}

struct FakeJob {
    script: VecDeque<JobStatus>,
    effect: Option<Effect>,
}

#[derive(Default)]
struct FakeState {
    todos: Vec<Item>,
    jobs: HashMap<String, FakeJob>,
    scripts: VecDeque<Vec<JobStatus>>,
    next_todo: u64,
    next_job: u64,
    calls: Vec<Call>,
    fail_next_request: Option<u16>,
    list_holds: VecDeque<Arc<Notify>>,
}

#[derive(Default)]
pub struct FakeTodoService {
    state: Mutex<FakeState>,
}

pub fn item(id: &str, title: &str, completed: bool) -> Item {
    Item {
        id: id.to_string(),
        title: title.to_string(),
        completed,
    }
}

impl FakeTodoService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_todos(todos: Vec<Item>) -> Arc<Self> {
        let service = Self::default();
        service.state.lock().todos = todos;
        Arc::new(service)
    }

    /// Status sequence for the next job created; the last status repeats.
    /// Jobs without a script complete on their first status query.
    pub fn script_next_job(&self, statuses: &[JobStatus]) {
        self.state.lock().scripts.push_back(statuses.to_vec());
    }

    /// Make the next request of any kind fail with `status`.
    pub fn fail_next_request(&self, status: u16) {
        self.state.lock().fail_next_request = Some(status);
    }

    /// The next list call snapshots the server list immediately but only
    /// returns once the returned `Notify` is signalled.
    pub fn hold_next_list(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.state.lock().list_holds.push_back(notify.clone());
        notify
    }

    /// Change the server-side list directly, as another client would.
    pub fn set_server_todos(&self, todos: Vec<Item>) {
        self.state.lock().todos = todos;
    }

    pub fn server_todos(&self) -> Vec<Item> {
        self.state.lock().todos.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn count_calls(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| predicate(c)).count()
    }

    fn record(&self, call: Call) -> SyncResult<()> {
        let mut state = self.state.lock();
        state.calls.push(call);
        match state.fail_next_request.take() {
            Some(status) => Err(SyncError::Api {
                status,
                message: "injected failure".to_string(),
            }),
            None => Ok(()),
        }
    }

    fn accept_job(&self, effect: Effect) -> JobHandle {
        let mut state = self.state.lock();
        state.next_job += 1;
        let id = format!("job-{}", state.next_job);
        let script = state
            .scripts
            .pop_front()
            .unwrap_or_else(|| vec![JobStatus::Completed]);
        state.jobs.insert(
            id.clone(),
            FakeJob {
                script: script.into_iter().collect(),
                effect: Some(effect),
            },
        );
        JobHandle {
            id,
            status: JobStatus::Pending,
        }
    }

    fn apply(state: &mut FakeState, effect: Effect) {
        match effect {
            Effect::Create(title) => {
                state.next_todo += 1;
                let id = format!("srv-{}", state.next_todo);
                state.todos.insert(0, item(&id, &title, false));
            }
            Effect::Toggle(id) => {
                if let Some(todo) = state.todos.iter_mut().find(|t| t.id == id) {
                    todo.completed = !todo.completed;
                }
            }
            Effect::Delete(id) => state.todos.retain(|t| t.id != id),
        }
    }
}

#[async_trait]
impl TodoApi for FakeTodoService {
    async fn list_todos(&self, page: u32, limit: u32) -> SyncResult<Vec<Item>> {
        self.record(Call::List { page, limit })?;
        let (snapshot, hold) = {
            let mut state = self.state.lock();
            let skip = (page.saturating_sub(1) * limit) as usize;
            let snapshot: Vec<Item> = state
                .todos
                .iter()
                .skip(skip)
                .take(limit as usize)
                .cloned()
                .collect();
            (snapshot, state.list_holds.pop_front())
        };
        if let Some(hold) = hold {
            hold.notified().await;
        }
        Ok(snapshot)
    }

    async fn get_todo(&self, id: &str) -> SyncResult<Item> {
        self.record(Call::Get(id.to_string()))?;
        self.state
            .lock()
            .todos
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| SyncError::Api {
                status: 404,
                message: "Not found".to_string(),
            })
    }

    async fn create_todo(&self, title: &str) -> SyncResult<JobHandle> {
        self.record(Call::Create(title.to_string()))?;
        Ok(self.accept_job(Effect::Create(title.to_string())))
    }

    async fn toggle_todo(&self, id: &str) -> SyncResult<JobHandle> {
        self.record(Call::Toggle(id.to_string()))?;
        Ok(self.accept_job(Effect::Toggle(id.to_string())))
    }

    async fn delete_todo(&self, id: &str) -> SyncResult<JobHandle> {
        self.record(Call::Delete(id.to_string()))?;
        Ok(self.accept_job(Effect::Delete(id.to_string())))
    }

    async fn job_status(&self, job_id: &str) -> SyncResult<JobHandle> {
        self.record(Call::JobStatus(job_id.to_string()))?;
        let mut state = self.state.lock();
        let job = state.jobs.get_mut(job_id).ok_or_else(|| SyncError::Api {
            status: 404,
            message: "Not found".to_string(),
        })?;

        let status = if job.script.len() > 1 {
            job.script.pop_front().unwrap_or(JobStatus::Completed)
        } else {
            job.script.front().copied().unwrap_or(JobStatus::Completed)
        };

        let effect = match status {
            JobStatus::Completed => job.effect.take(),
            JobStatus::Failed => {
                job.effect = None;
                None
            }
            JobStatus::Pending => None,
        };
        if let Some(effect) = effect {
            Self::apply(&mut state, effect);
        }

        Ok(JobHandle {
            id: job_id.to_string(),
            status,
        })
    }
}
