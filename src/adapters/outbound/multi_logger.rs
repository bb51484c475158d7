use crate::domains::logger::DomainLogger;
use std::sync::Arc;

/// Fans every record out to a list of loggers, in order.
pub struct MultiLogger {
    targets: Vec<Arc<dyn DomainLogger>>,
}

impl MultiLogger {
    pub fn new(targets: Vec<Arc<dyn DomainLogger>>) -> Self {
        Self { targets }
    }
}

impl DomainLogger for MultiLogger {
    fn debug(&self, msg: &str) {
        self.targets.iter().for_each(|t| t.debug(msg));
    }

    fn info(&self, msg: &str) {
        self.targets.iter().for_each(|t| t.info(msg));
    }

    fn warn(&self, msg: &str) {
        self.targets.iter().for_each(|t| t.warn(msg));
    }

    fn error(&self, msg: &str) {
        self.targets.iter().for_each(|t| t.error(msg));
    }
}

/// File logger plus console when `file` is set and `fast_log` installs;
/// console alone otherwise.
pub fn init_combined_logger(file: Option<&str>, level: &str) -> Arc<dyn DomainLogger> {
    let verbose = level.eq_ignore_ascii_case("debug") || level.eq_ignore_ascii_case("trace");
    let console = super::init_console_logger("floor-nav", verbose);
    let Some(path) = file else {
        return console;
    };
    match super::file_logger::init_file_logger(path, level) {
        Ok(file_logger) => Arc::new(MultiLogger::new(vec![file_logger, console])),
        Err(e) => {
            console.warn(&e);
            console
        }
    }
}
