use crate::domains::logger::{parse_level, DomainLogger, FileLogger};
use std::sync::Arc;

/// Installs the `fast_log` file appender at `level` and returns a logger
/// the application can inject into navigation contexts.
pub fn init_file_logger(path: &str, level: &str) -> Result<Arc<dyn DomainLogger>, String> {
    FileLogger::init(path, parse_level(level))
        .map_err(|e| format!("Failed to initialize fast_log at {}: {}", path, e))?;
    Ok(Arc::new(FileLogger))
}
