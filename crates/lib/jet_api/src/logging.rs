//! Process-wide `tracing` subscriber setup.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use crate::config::{AppSection, LogFormat, LogOutput, LoggingConfig};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log level: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to open log file: {0}")]
    File(#[from] std::io::Error),

    #[error("logger already installed: {0}")]
    Init(#[from] TryInitError),
}

/// Keeps the log file sink alive; syncs it to disk on drop.
#[derive(Debug)]
pub struct LogGuard {
    file: Option<Arc<File>>,
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            let _ = file.sync_all();
        }
    }
}

/// Open `path` for appending, creating parent directories as needed.
pub fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber. `RUST_LOG`, when set, replaces the
/// configured level. Debug mode adds source file and line to each event.
pub fn init(config: &LoggingConfig, app: &AppSection) -> Result<LogGuard, LoggingError> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let file = match config.output {
        LogOutput::Stdout => None,
        LogOutput::File | LogOutput::Both => Some(Arc::new(open_log_file(&config.file_path)?)),
    };
    let writer = match (config.output, &file) {
        (LogOutput::File, Some(f)) => BoxMakeWriter::new(f.clone()),
        (LogOutput::Both, Some(f)) => BoxMakeWriter::new(std::io::stdout.and(f.clone())),
        _ => BoxMakeWriter::new(std::io::stdout),
    };

    let with_source = app.is_debug();
    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_file(with_source)
                    .with_line_number(with_source),
            )
            .try_init()?,
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(config.output == LogOutput::Stdout)
                    .with_writer(writer)
                    .with_file(with_source)
                    .with_line_number(with_source),
            )
            .try_init()?,
    }

    Ok(LogGuard { file })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_parent_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("logs").join("app.log");
        let file = open_log_file(&path).unwrap();
        drop(file);
        assert!(path.exists());
    }

    #[test]
    fn log_file_is_appended_not_truncated() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        writeln!(open_log_file(&path).unwrap(), "first").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second").unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!("first\nsecond\n", contents);
    }
}
