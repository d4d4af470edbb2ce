pub mod connections;
pub mod game_handlers;
pub mod handler;

pub use connections::{Channel, ChannelClosed, ConnectionRegistry};
pub use game_handlers::{GateError, Session};
pub use handler::{ws_index, ChessWebSocket};
