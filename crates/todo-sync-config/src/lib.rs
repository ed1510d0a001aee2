//! Configuration and logging setup for the todo-sync client.

mod config;
mod error;
mod logging;

pub use config::{
    Config, DEFAULT_API_URL, DEFAULT_LOG_LEVEL, DEFAULT_PAGE_LIMIT, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_POLL_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT_SECS, MAX_PAGE_LIMIT,
};
pub use error::{ConfigError, ConfigResult};
pub use logging::{init_logging, init_logging_for_service};
