//! Structured logging setup, shared by every binary in the workspace.
//!
//! Reads `RUST_LOG` for filtering, `LOG_FORMAT` (`text` default, or `json`)
//! for the output encoding, and an optional `LOG_FILE` path for a
//! daily-rotating file appender in addition to stderr.

use std::env;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Guard returned by [`init`]; drop it only at process shutdown, otherwise
/// the file appender's background flush thread is torn down early.
pub struct LoggingGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

pub fn init() -> LoggingGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false);
    let log_file = env::var("LOG_FILE").ok();

    let file_layer_and_guard = log_file.map(|path| {
        let directory = std::path::Path::new(&path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."))
            .to_path_buf();
        let file_name = std::path::Path::new(&path)
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| "litscan.log".to_string());
        let appender = tracing_appender::rolling::daily(directory, file_name);
        tracing_appender::non_blocking(appender)
    });

    let (file_writer, file_guard) = match file_layer_and_guard {
        Some((writer, guard)) => (Some(writer), Some(guard)),
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        let stderr_layer = fmt::layer().json().with_writer(std::io::stderr);
        match file_writer {
            Some(writer) => {
                let file_layer = fmt::layer().json().with_writer(writer).with_ansi(false);
                registry.with(stderr_layer).with(file_layer).init();
            }
            None => registry.with(stderr_layer).init(),
        }
    } else {
        let stderr_layer = fmt::layer().with_writer(std::io::stderr);
        match file_writer {
            Some(writer) => {
                let file_layer = fmt::layer().with_writer(writer).with_ansi(false);
                registry.with(stderr_layer).with(file_layer).init();
            }
            None => registry.with(stderr_layer).init(),
        }
    }

    LoggingGuard { _file_guard: file_guard }
}
