use chrono::Utc;
use log::{debug as log_debug, error as log_error, info as log_info, warn as log_warn};
use std::sync::Arc;

/// Logging port used by the navigation domain.
/// Non-fallible: a failed log write never fails a path search.
pub trait DomainLogger: Send + Sync + 'static {
    fn debug(&self, msg: &str);
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

pub type DynLogger = Arc<dyn DomainLogger>;

const LOG_TARGET: &str = "floor_nav";

/// File-backed logger using `fast_log` for writing and `log` for dispatch.
pub struct FileLogger;

impl FileLogger {
    /// Installs `fast_log` as the global `log` backend, writing to `path`.
    /// Console output is left to the console adapter.
    pub fn init(path: &str, level: log::LevelFilter) -> Result<(), Box<dyn std::error::Error>> {
        fast_log::init(
            fast_log::config::Config::new()
                .file(path)
                .level(level),
        )?;
        Ok(())
    }
}

impl DomainLogger for FileLogger {
    fn debug(&self, msg: &str) {
        log_debug!(target: LOG_TARGET, "{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn info(&self, msg: &str) {
        log_info!(target: LOG_TARGET, "{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn warn(&self, msg: &str) {
        log_warn!(target: LOG_TARGET, "{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn error(&self, msg: &str) {
        log_error!(target: LOG_TARGET, "{} - {}", Utc::now().to_rfc3339(), msg);
    }
}

/// Parses a level name from configuration, defaulting to `Info`.
pub fn parse_level(level: &str) -> log::LevelFilter {
    level.parse().unwrap_or(log::LevelFilter::Info)
}
