use crate::domains::logger::DomainLogger;
use std::sync::Arc;

/// Writes domain logs straight to stdout/stderr, tagged with a component name.
struct ConsoleBridge {
    component: String,
    verbose: bool,
}

impl DomainLogger for ConsoleBridge {
    fn debug(&self, msg: &str) {
        if self.verbose {
            println!("[{}] DEBUG: {}", self.component, msg);
        }
    }
    fn info(&self, msg: &str) { println!("[{}] {}", self.component, msg); }
    fn warn(&self, msg: &str) { println!("[{}] WARN: {}", self.component, msg); }
    fn error(&self, msg: &str) { eprintln!("[{}] ERROR: {}", self.component, msg); }
}

/// Console-backed logger, used on its own or as the fallback when the file
/// logger cannot be installed. Debug lines are printed only when `verbose`.
pub fn init_console_logger(component: &str, verbose: bool) -> Arc<dyn DomainLogger> {
    Arc::new(ConsoleBridge {
        component: component.to_string(),
        verbose,
    })
}
