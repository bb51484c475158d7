pub mod clock;
pub mod context;
pub mod events;
pub mod grid;
pub mod layout;
pub mod obstacle;
pub mod ports;
pub mod projections;
pub mod actors;
pub mod reservation;
pub mod search;
pub mod smoothing;
pub mod types;

pub use actors::*;
pub use clock::*;
pub use context::*;
pub use events::*;
pub use grid::*;
pub use layout::*;
pub use obstacle::*;
pub use ports::*;
pub use projections::*;
pub use reservation::*;
pub use search::*;
pub use smoothing::*;
pub use types::*;
