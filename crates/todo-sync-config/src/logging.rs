//! Logging initialization for todo-sync binaries.
//!
//! Wraps the `observability` package so binaries only pick a level.
//! `TODO_SYNC_LOG_FORMAT=json` switches stderr output to JSON lines and
//! `TODO_SYNC_LOG_FILE` appends JSON lines to a file instead.

use observability::{LogConfig, LogFormat};
use std::path::PathBuf;

const DEFAULT_SERVICE_NAME: &str = "todo-sync";

/// Initialize logging for the default service name.
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init_logging(level: &str) {
    init_logging_for_service(DEFAULT_SERVICE_NAME, level);
}

/// Initialize logging with a custom service name.
pub fn init_logging_for_service(service_name: &str, level: &str) {
    observability::init_with_config(log_config(service_name, level, |key| {
        std::env::var(key).ok()
    }));
}

fn log_config<F>(service_name: &str, level: &str, lookup: F) -> LogConfig
where
    F: Fn(&str) -> Option<String>,
{
    let format = lookup("TODO_SYNC_LOG_FORMAT")
        .map(|raw| LogFormat::from_name(&raw))
        .unwrap_or_default();
    let log_path = lookup("TODO_SYNC_LOG_FILE")
        .and_then(non_empty_env)
        .map(PathBuf::from);

    LogConfig {
        service_name: service_name.into(),
        default_level: level.into(),
        format,
        log_path,
        also_stderr: false,
    }
}

fn non_empty_env(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
