//! Gateway logging
//!
//! Two sinks share one filter: JSON lines in a rotating file (size and daily
//! rotation, numbered files) and compact human-readable lines on stdout.
//! `RUST_LOG` replaces [`DEFAULT_FILTER`] when set.

use anyhow::{Context as _, Result};
use rolling_file::{RollingConditionBasic, RollingFileAppender};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

pub const DEFAULT_FILTER: &str =
    "nendb_gateway=debug,nendb_rs=debug,tracing_actix_web=info,actix_web=info";

/// Keeps the background log writer alive. Dropping it, or calling
/// [`TelemetryGuard::shutdown`], flushes whatever is still buffered.
pub struct TelemetryGuard {
    writer: WorkerGuard,
    log_file: PathBuf,
}

impl TelemetryGuard {
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Flush buffered lines to the log file and stop the writer thread
    pub fn shutdown(self) {
        tracing::info!(log_file = ?self.log_file, "flushing logs");
        drop(self.writer);
    }
}

fn file_appender(logging: &LoggingConfig) -> Result<(RollingFileAppender<RollingConditionBasic>, PathBuf)> {
    let dir = Path::new(&logging.dir);
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;

    let log_file = dir.join(&logging.file_name);
    let condition = RollingConditionBasic::new()
        .daily()
        .max_size(logging.max_file_bytes);
    let appender = RollingFileAppender::new(&log_file, condition, logging.max_files)
        .with_context(|| format!("cannot open log file {}", log_file.display()))?;
    Ok((appender, log_file))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber
pub fn init_telemetry(logging: &LoggingConfig) -> Result<TelemetryGuard> {
    let (appender, log_file) = file_appender(logging)?;
    let (file_writer, writer) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .json()
        .with_writer(file_writer)
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(true)
        .with_target(true)
        .with_thread_names(true);

    let console_layer = fmt::layer()
        .compact()
        .with_writer(std::io::stdout)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    tracing::info!(
        log_file = ?log_file,
        max_file_bytes = logging.max_file_bytes,
        max_files = logging.max_files,
        "logging initialized"
    );

    Ok(TelemetryGuard { writer, log_file })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn test_file_appender_creates_directory() {
        let dir = std::env::temp_dir().join(format!("nendb-gateway-logs-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let logging = LoggingConfig {
            dir: dir.to_string_lossy().into_owned(),
            file_name: "gateway.log".to_string(),
            ..LoggingConfig::default()
        };

        let (mut appender, log_file) = file_appender(&logging).unwrap();
        assert_eq!(log_file, dir.join("gateway.log"));

        appender.write_all(b"{\"msg\":\"hello\"}\n").unwrap();
        appender.flush().unwrap();
        let contents = std::fs::read_to_string(&log_file).unwrap();
        assert!(contents.contains("hello"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
