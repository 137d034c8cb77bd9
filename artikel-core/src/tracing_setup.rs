//! Tracing setup for Artikel
//!
//! Console output at a caller-chosen level, plus an optional full trace log
//! on disk for debugging lookups against the remote service.

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Name of the trace file written into the logs directory.
pub const LOG_FILE_NAME: &str = "artikel-last-run.log";

/// Initialize tracing with console output and, if `logs_dir` is given, a
/// trace-level log file overwritten on every run.
///
/// `RUST_LOG` takes precedence over `console_level` for the console.
///
/// # Errors
///
/// - `std::io::Error` - If the logs directory or log file cannot be created
/// - `tracing_subscriber::util::TryInitError` - If a global subscriber is already set
pub fn init_tracing(
    console_level: LogLevel,
    logs_dir: Option<&Path>,
) -> Result<Option<PathBuf>, Box<dyn std::error::Error + Send + Sync>> {
    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::default()
            .add_directive(LevelFilter::from_level(console_level.as_tracing_level()).into())
    });

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(console_filter);

    let Some(logs_dir) = logs_dir else {
        tracing_subscriber::registry().with(console_layer).try_init()?;
        tracing::info!("Tracing initialized: console={console_level}");
        return Ok(None);
    };

    create_dir_all(logs_dir)?;
    let log_file_path = logs_dir.join(LOG_FILE_NAME);
    let log_file = File::create(&log_file_path)?;

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(log_file)
        .with_filter(EnvFilter::new("trace"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    tracing::info!(
        "Tracing initialized: console={}, debug_file={}",
        console_level,
        log_file_path.display()
    );

    Ok(Some(log_file_path))
}

/// Log levels accepted from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Converts to the corresponding `tracing::Level`.
    ///
    /// # Examples
    /// ```
    /// use artikel_core::tracing_setup::LogLevel;
    ///
    /// let level = LogLevel::Info.as_tracing_level();
    /// assert_eq!(level, tracing::Level::INFO);
    /// ```
    pub fn as_tracing_level(self) -> Level {
        match self {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!("Invalid log level: {s}")),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("WARN".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("trace".parse::<LogLevel>(), Ok(LogLevel::Trace));
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Debug.to_string(), "debug");
        assert_eq!(LogLevel::Error.as_tracing_level(), Level::ERROR);
    }

    #[test]
    fn test_init_tracing_writes_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let logs_dir = dir.path().join("logs");

        let path = init_tracing(LogLevel::Warn, Some(&logs_dir)).unwrap().unwrap();

        assert_eq!(path, logs_dir.join(LOG_FILE_NAME));
        assert!(path.exists());

        // Only one global subscriber per process
        assert!(init_tracing(LogLevel::Warn, None).is_err());
    }
}
