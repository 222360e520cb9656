//! Logging Infrastructure
//!
//! Structured logging for development (pretty, stderr) and production
//! (JSON, optional daily rolling file).

use std::path::Path;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Initialize the logger with defaults (info, text, stderr)
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Initialize the logger.
///
/// `RUST_LOG` wins over `log_level` when set. With `log_dir` pointing at an
/// existing directory, output goes to a daily rolling `market-server.*` file
/// instead of stderr.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let writer = match log_dir.map(Path::new) {
        Some(dir) if dir.is_dir() => {
            BoxMakeWriter::new(tracing_appender::rolling::daily(dir, "market-server"))
        }
        _ => BoxMakeWriter::new(std::io::stderr),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true);

    // A second init (tests, embedded use) keeps the first subscriber
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        tracing::debug!("Logger already initialized: {e}");
    }
}
