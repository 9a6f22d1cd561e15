//! Logging infrastructure.
//!
//! Structured logging for the pipeline and fork/join engines:
//! - File output under a configurable directory, via a non-blocking writer
//! - Stdout output for interactive use
//! - Level filtering through the `RUST_LOG` environment variable
//!   (defaults to `info`)

use std::fs;
use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default log directory.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "forkline.log";

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping the guard flushes and closes the file writer.
pub struct LogGuard {
    _file_guard: WorkerGuard,
}

/// Initializes the global tracing subscriber with file and stdout output.
///
/// Call once at startup and hold the returned guard until the process
/// exits.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created.
pub fn init_logging(log_dir: &str, log_file: &str) -> Result<LogGuard, io::Error> {
    fs::create_dir_all(log_dir)?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(true);

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_ansi(true);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}
