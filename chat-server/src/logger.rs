//! Logging setup for the property-chat binary.
//!
//! Console and log file share one fmt layer, so both carry the same full format:
//! level, target, thread id, span close events and every structured field.
//! The file is opened in append mode; restarts never truncate earlier runs.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Level used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_LEVEL: &str = "info";

/// Opens `path` for appending, creating the file and any missing parent directories.
pub fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Installs the global tracing subscriber, writing to stdout and `log_file_path`.
///
/// The level filter is read from `RUST_LOG` (e.g. `info`, `property_chat=debug,sqlx=warn`)
/// and falls back to `info`. Load `.env` (`dotenvy::dotenv()`) before calling this,
/// otherwise a `RUST_LOG` set there is ignored. Fails if a global subscriber is
/// already installed.
pub fn init_tracing(log_file_path: &str) -> anyhow::Result<()> {
    let file = Arc::new(open_log_file(log_file_path)?);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout.and(file))
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .with_file(false)
        .with_line_number(false);

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    Ok(())
}
