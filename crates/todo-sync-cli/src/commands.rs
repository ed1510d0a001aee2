//! Command execution against the reconciliation engine.

use std::sync::Arc;

use anyhow::Context;
use todo_sync_config::Config;
use todo_sync_core::{
    HttpClientConfig, HttpTodoApi, ItemStore, OperationTracker, PollPolicy, TodoApi, TodoSync,
};
use tracing::{info, warn};

use crate::render;
use crate::Commands;

/// Poll policy from configuration.
pub fn poll_policy(config: &Config) -> PollPolicy {
    let policy = match config.poll_max_attempts {
        Some(max_attempts) => PollPolicy::default().with_max_attempts(max_attempts),
        None => PollPolicy::unbounded(),
    };
    policy.with_interval(config.poll_interval())
}

fn build_sync(config: &Config) -> anyhow::Result<TodoSync> {
    let api = HttpTodoApi::new(
        HttpClientConfig::new(config.api_url.clone()).with_timeout(config.request_timeout()),
    )
    .context("failed to build HTTP client")?;
    let api: Arc<dyn TodoApi> = Arc::new(api);

    Ok(TodoSync::new(
        api,
        ItemStore::new(),
        OperationTracker::new(),
        poll_policy(config),
    )
    .with_page_limit(config.page_limit))
}

pub async fn run(command: Commands, config: &Config) -> anyhow::Result<()> {
    let sync = build_sync(config)?;

    sync.fetch()
        .await
        .with_context(|| format!("failed to fetch todos from {}", config.api_url))?;

    // Report in-flight work on stderr while a job is being polled.
    let mut progress = sync.tracker().subscribe();
    let progress_task = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let state = progress.borrow_and_update().clone();
            if let Some(line) = render::progress_line(&state) {
                eprintln!("{}", line);
            }
        }
    });

    let result = execute(&command, &sync).await;
    progress_task.abort();
    result?;

    if let Commands::Remaining = command {
        println!("{}", render::remaining_line(sync.remaining_count()));
        return Ok(());
    }

    print!("{}", render::render_list(&sync.items()));
    Ok(())
}

async fn execute(command: &Commands, sync: &TodoSync) -> anyhow::Result<()> {
    match command {
        Commands::List | Commands::Remaining => Ok(()),
        Commands::Add { title } => {
            sync.create(title).await.context("create failed")?;
            info!(title = %title.trim(), "Created");
            Ok(())
        }
        Commands::Toggle { id } => {
            ensure_known(sync, id);
            sync.toggle(id)
                .await
                .with_context(|| format!("toggle of {} failed", id))
        }
        Commands::Delete { id } => {
            ensure_known(sync, id);
            sync.delete(id)
                .await
                .with_context(|| format!("delete of {} failed", id))
        }
        Commands::Show { id } => {
            let item = sync
                .refresh_one(id)
                .await
                .with_context(|| format!("could not read todo {}", id))?;
            println!("{}", render::item_line(&item));
            Ok(())
        }
    }
}

fn ensure_known(sync: &TodoSync, id: &str) {
    if sync.store().get(id).is_none() {
        warn!(todo_id = %id, "Todo not in the fetched list, sending anyway");
    }
}
