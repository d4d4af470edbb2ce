use super::chess_move::ChessMove;
use super::engine::ChessGame;
use super::piece::{PieceType, TeamColor};

/// Check, checkmate and stalemate flags for both sides after a move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionReport {
    pub white_check: bool,
    pub white_checkmate: bool,
    pub white_stalemate: bool,
    pub black_check: bool,
    pub black_checkmate: bool,
    pub black_stalemate: bool,
}

impl PositionReport {
    /// Evaluates white first, then black, each as check, checkmate, stalemate.
    /// The order matters: a checkmate latches in `game` and silences every
    /// stalemate query that follows it.
    pub fn evaluate(game: &mut ChessGame) -> Self {
        let white_check = game.is_in_check(TeamColor::White);
        let white_checkmate = game.is_in_checkmate(TeamColor::White);
        let white_stalemate = game.is_in_stalemate(TeamColor::White);
        let black_check = game.is_in_check(TeamColor::Black);
        let black_checkmate = game.is_in_checkmate(TeamColor::Black);
        let black_stalemate = game.is_in_stalemate(TeamColor::Black);
        PositionReport {
            white_check,
            white_checkmate,
            white_stalemate,
            black_check,
            black_checkmate,
            black_stalemate,
        }
    }

    pub fn is_checkmate(&self) -> bool {
        self.white_checkmate || self.black_checkmate
    }

    /// Both sides are out of moves without a checkmate.
    pub fn is_stalemate(&self) -> bool {
        !self.is_checkmate() && self.white_stalemate && self.black_stalemate
    }

    pub fn ends_game(&self) -> bool {
        self.is_checkmate() || self.is_stalemate()
    }

    /// Check warnings for players, empty when nothing is in check or the game is over.
    pub fn check_lines(&self) -> String {
        let mut lines = String::new();
        if self.is_checkmate() {
            return lines;
        }
        if self.white_check {
            lines.push_str("White is in check.\n");
        }
        if self.black_check {
            lines.push_str("Black is in check.\n");
        }
        lines
    }

    /// The announcement for a finished game, if this position finished it.
    pub fn outcome(&self) -> Option<String> {
        if self.white_checkmate {
            Some("White is in checkmate. Black wins.\n".to_string())
        } else if self.black_checkmate {
            Some("Black is in checkmate. White wins.\n".to_string())
        } else if self.is_stalemate() {
            Some("The game is in stalemate.\n".to_string())
        } else {
            None
        }
    }
}

/// "alice moved pawn from E7 to E8 and promoted it to queen."
pub fn describe_move(username: &str, moved: PieceType, mv: &ChessMove) -> String {
    let mut description = format!("{} moved {} from {} to {}", username, moved, mv.start, mv.end);
    if let Some(promotion) = mv.promotion {
        description.push_str(&format!(" and promoted it to {}", promotion));
    }
    description.push_str(".\n");
    description
}
