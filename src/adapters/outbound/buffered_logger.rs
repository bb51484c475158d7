use crate::domains::logger::DomainLogger;
use super::memory_logger::LogLevel;
use std::sync::Arc;
use tokio::sync::mpsc;

struct LogMessage {
    level: LogLevel,
    msg: String,
}

struct BufferedLogger {
    sender: mpsc::Sender<LogMessage>,
}

impl BufferedLogger {
    // Never blocks the caller; a full buffer drops the record.
    fn forward(&self, level: LogLevel, msg: &str) {
        let _ = self.sender.try_send(LogMessage { level, msg: msg.to_string() });
    }
}

impl DomainLogger for BufferedLogger {
    fn debug(&self, msg: &str) { self.forward(LogLevel::Debug, msg); }
    fn info(&self, msg: &str) { self.forward(LogLevel::Info, msg); }
    fn warn(&self, msg: &str) { self.forward(LogLevel::Warn, msg); }
    fn error(&self, msg: &str) { self.forward(LogLevel::Error, msg); }
}

/// Decouples path searches from slow log sinks: records go through a bounded
/// channel of `capacity` and a background task hands them to `sink`.
/// Must be called inside a tokio runtime.
pub fn init_buffered_logger(sink: Arc<dyn DomainLogger>, capacity: usize) -> Arc<dyn DomainLogger> {
    let (tx, mut rx) = mpsc::channel::<LogMessage>(capacity.max(1));

    tokio::spawn(async move {
        while let Some(record) = rx.recv().await {
            match record.level {
                LogLevel::Debug => sink.debug(&record.msg),
                LogLevel::Info => sink.info(&record.msg),
                LogLevel::Warn => sink.warn(&record.msg),
                LogLevel::Error => sink.error(&record.msg),
            }
        }
    });

    Arc::new(BufferedLogger { sender: tx })
}
