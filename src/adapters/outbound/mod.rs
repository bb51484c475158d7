pub mod buffered_logger;
pub mod console_logger;
pub mod file_logger;
pub mod layout_source;
pub mod memory_logger;
pub mod multi_logger;
pub mod noop_logger;

pub use buffered_logger::*;
pub use console_logger::*;
pub use file_logger::*;
pub use layout_source::*;
pub use memory_logger::*;
pub use multi_logger::*;
pub use noop_logger::*;
