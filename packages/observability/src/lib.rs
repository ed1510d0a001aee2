//! # Observability
//!
//! Tracing subscriber setup for the todo-sync crates.
//!
//! Library code only ever emits events through the `tracing` macros. Binaries
//! call [`init`] or [`init_with_config`] once at startup to decide where those
//! events go:
//!
//! - compact, human readable lines on stderr (default)
//! - JSON lines on stderr ([`LogFormat::Json`])
//! - JSON lines appended to a log file (`log_path`), optionally mirrored to stderr
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init_with_config(observability::LogConfig {
//!         service_name: "todo-sync".into(),
//!         default_level: "debug".into(),
//!         ..Default::default()
//!     });
//!     tracing::info!("ready");
//! }
//! ```

mod json_layer;
mod writer;

use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

pub use json_layer::{JsonLayer, LogEntry};
pub use writer::FileLogWriter;

/// Output format for stderr logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single-line human readable output.
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parse a format name. Unknown names fall back to `Compact`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" | "jsonl" => Self::Json,
            _ => Self::Compact,
        }
    }
}

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service, written into every JSON line.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by `RUST_LOG` environment variable.
    pub default_level: String,

    /// Format used for stderr output.
    pub format: LogFormat,

    /// Optional JSONL file to append to.
    pub log_path: Option<PathBuf>,

    /// Mirror to stderr when a log file is configured.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            format: LogFormat::Compact,
            log_path: None,
            also_stderr: false,
        }
    }
}

impl LogConfig {
    /// Whether events end up on stderr with this configuration.
    pub fn writes_to_stderr(&self) -> bool {
        self.log_path.is_none() || self.also_stderr
    }
}

/// Initialize logging with default settings for `service_name`.
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    });
}

/// Initialize logging with custom configuration.
///
/// Installing a second global subscriber is a no-op, so tests and binaries
/// may call this more than once.
pub fn init_with_config(config: LogConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let mut file_opened = false;
    if let Some(path) = &config.log_path {
        match FileLogWriter::open(path) {
            Ok(writer) => {
                layers.push(JsonLayer::new(config.service_name.clone(), writer).boxed());
                file_opened = true;
            }
            Err(e) => {
                // No subscriber exists yet, so stderr is the only place to say so.
                eprintln!(
                    "observability: failed to open log file {}: {}",
                    path.display(),
                    e
                );
            }
        }
    }

    if !file_opened || config.also_stderr {
        match config.format {
            LogFormat::Json => {
                layers.push(JsonLayer::new(config.service_name.clone(), std::io::stderr).boxed())
            }
            LogFormat::Compact => layers.push(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .compact()
                    .with_writer(std::io::stderr)
                    .boxed(),
            ),
        }
    }

    let installed = tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(
            service = %config.service_name,
            format = ?config.format,
            log_path = ?config.log_path,
            "observability initialized"
        );
    }
}

/// Re-export tracing macros for convenience.
pub use tracing::{debug, error, info, instrument, trace, warn};
