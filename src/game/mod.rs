//! Chess rules: the board, per-piece move generation, and the game engine
//! that filters self-check, applies moves and detects check, checkmate and
//! stalemate.

pub mod board;
pub mod chess_move;
pub mod engine;
pub mod piece;
pub mod utils;

pub use board::{ChessBoard, ChessPosition};
pub use chess_move::ChessMove;
pub use engine::{ChessGame, InvalidMove};
pub use piece::{ChessPiece, PieceType, TeamColor};
