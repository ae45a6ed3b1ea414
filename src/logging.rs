//! Tracing setup.
//!
//! Events go to stderr so stdout only ever carries the rendered report. When
//! the settings enable it, the same events are also appended to a daily log
//! file under the data directory.

use crate::config::{AppSettings, Paths};
use crate::error::{ConfigError, ConfigResult};
use std::fs;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_FILE_PREFIX: &str = "nettrackr";

/// Filter used when `RUST_LOG` is unset: verbosity flags, then settings.
pub fn default_level(settings: &AppSettings, verbose: bool, quiet: bool) -> &str {
    if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        settings.log_level.as_str()
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the log file on drop; keep it alive for the
/// whole run.
pub fn init(settings: &AppSettings, verbose: bool, quiet: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level(settings, verbose, quiet)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer().with_writer(io::stderr).with_target(false);

    let mut guard = None;
    let mut file_error = None;
    let file_layer = if settings.log_file {
        match Paths::get()
            .and_then(|paths| file_appender(&paths.logs_dir(), settings.log_max_files))
        {
            Ok(appender) => {
                let (writer, flush_guard) = tracing_appender::non_blocking(appender);
                guard = Some(flush_guard);
                Some(fmt::layer().with_writer(writer).with_ansi(false))
            }
            Err(e) => {
                file_error = Some(e);
                None
            }
        }
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        tracing::warn!(error = %e, "logging to stderr only");
    }
    guard
}

/// Daily-rotated `nettrackr.*.log` files in `dir`, keeping at most `max_files`.
pub fn file_appender(dir: &Path, max_files: usize) -> ConfigResult<RollingFileAppender> {
    fs::create_dir_all(dir)?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(max_files.max(1))
        .build(dir)
        .map_err(|e| ConfigError::WriteFailed {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })
}
