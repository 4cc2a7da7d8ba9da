//! Tracing setup: a stdout layer always, plus a daily-rolling file layer
//! when `ENABLE_FILE_LOGS` is on.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::parse_bool;

pub const DEFAULT_LOG_DIR: &str = "./logs";
pub const DEFAULT_LOG_FILE_PREFIX: &str = "pengyou";

/// Where the rolling log files go. Files are named `<prefix>.log.<date>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLogSettings {
    pub dir: PathBuf,
    pub prefix: String,
}

impl FileLogSettings {
    /// Reads `ENABLE_FILE_LOGS`, `LOG_DIR` and `LOG_FILE_PREFIX`.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `None` unless `ENABLE_FILE_LOGS` parses as true. Blank values fall back
    /// to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let enabled = lookup("ENABLE_FILE_LOGS")
            .and_then(|value| parse_bool(&value))
            .unwrap_or(false);
        if !enabled {
            return None;
        }

        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Some(Self {
            dir: non_blank("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
            prefix: non_blank("LOG_FILE_PREFIX")
                .map(|prefix| prefix.trim().to_string())
                .unwrap_or_else(|| DEFAULT_LOG_FILE_PREFIX.to_string()),
        })
    }
}

/// Keeps the background file writer alive; drop it only at shutdown.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Installs the global subscriber. An unparseable `log_level` falls back to
/// `info`. If the log directory cannot be created the file layer is skipped
/// and stdout logging still starts.
pub fn init_tracing(log_level: &str, file_logs: Option<FileLogSettings>) -> Option<FileLogGuard> {
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(true);

    let file_writer = file_logs.and_then(|settings| match std::fs::create_dir_all(&settings.dir) {
        Ok(()) => {
            let file_name = format!("{}.log", settings.prefix);
            let appender = RollingFileAppender::new(Rotation::DAILY, &settings.dir, file_name);
            Some(tracing_appender::non_blocking(appender))
        }
        Err(err) => {
            eprintln!("failed to create log directory {}: {err}", settings.dir.display());
            None
        }
    });

    let Some((writer, guard)) = file_writer else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stdout_layer)
            .init();
        return None;
    };

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Some(FileLogGuard { _guard: guard })
}
