use crate::domains::logger::DomainLogger;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
}

/// Keeps every record in memory so callers can inspect what was logged.
#[derive(Debug, Default, Clone)]
pub struct MemoryLogger {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().clone()
    }

    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|r| r.level == level)
            .map(|r| r.message.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn push(&self, level: LogLevel, msg: &str) {
        self.lock().push(LogRecord {
            level,
            message: msg.to_string(),
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DomainLogger for MemoryLogger {
    fn debug(&self, msg: &str) { self.push(LogLevel::Debug, msg); }
    fn info(&self, msg: &str) { self.push(LogLevel::Info, msg); }
    fn warn(&self, msg: &str) { self.push(LogLevel::Warn, msg); }
    fn error(&self, msg: &str) { self.push(LogLevel::Error, msg); }
}
