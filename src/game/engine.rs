use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::board::{ChessBoard, ChessPosition};
use super::chess_move::ChessMove;
use super::piece::TeamColor;

/// Why the engine refused a move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidMove {
    #[error("there is no piece at {0}")]
    NoPiece(ChessPosition),
    #[error("it is not {0}'s turn")]
    NotYourTurn(TeamColor),
    #[error("{0} is not a legal move")]
    IllegalMove(ChessMove),
}

/// A game in progress: the board, whose turn it is, and whether a checkmate
/// has already been recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChessGame {
    board: ChessBoard,
    team_turn: TeamColor,
    // Once set, stalemate is never reported again for this game.
    #[serde(default)]
    checkmate_recorded: bool,
}

impl Default for ChessGame {
    fn default() -> Self {
        Self::new()
    }
}

impl ChessGame {
    /// A fresh game from the standard setup, white to move.
    pub fn new() -> Self {
        ChessGame {
            board: ChessBoard::standard(),
            team_turn: TeamColor::White,
            checkmate_recorded: false,
        }
    }

    pub fn with_board(board: ChessBoard, team_turn: TeamColor) -> Self {
        ChessGame {
            board,
            team_turn,
            checkmate_recorded: false,
        }
    }

    pub fn board(&self) -> &ChessBoard {
        &self.board
    }

    pub fn set_board(&mut self, board: ChessBoard) {
        self.board = board;
    }

    pub fn team_turn(&self) -> TeamColor {
        self.team_turn
    }

    pub fn set_team_turn(&mut self, team: TeamColor) {
        self.team_turn = team;
    }

    pub fn checkmate_recorded(&self) -> bool {
        self.checkmate_recorded
    }

    /// Moves the piece on `start` may legally make. Empty when the square is empty.
    ///
    /// Each candidate is tried on a throwaway copy of the board; the live board
    /// is never touched.
    pub fn valid_moves(&self, start: ChessPosition) -> HashSet<ChessMove> {
        let Some(piece) = self.board.get_piece(start) else {
            return HashSet::new();
        };
        piece
            .piece_moves(&self.board, start)
            .into_iter()
            .filter(|candidate| {
                let mut simulated = self.board.clone();
                simulated.apply_move(candidate);
                !king_in_check(&simulated, piece.team_color)
            })
            .collect()
    }

    /// Every legal move available to `color`.
    pub fn all_valid_moves(&self, color: TeamColor) -> HashSet<ChessMove> {
        self.board
            .pieces()
            .filter(|(_, piece)| piece.team_color == color)
            .flat_map(|(position, _)| self.valid_moves(position))
            .collect()
    }

    pub fn make_move(&mut self, mv: ChessMove) -> Result<(), InvalidMove> {
        let piece = self
            .board
            .get_piece(mv.start)
            .ok_or(InvalidMove::NoPiece(mv.start))?;
        if piece.team_color != self.team_turn {
            return Err(InvalidMove::NotYourTurn(piece.team_color));
        }
        if !self.valid_moves(mv.start).contains(&mv) {
            return Err(InvalidMove::IllegalMove(mv));
        }
        self.board.apply_move(&mv);
        self.team_turn = self.team_turn.opponent();
        Ok(())
    }

    pub fn is_in_check(&self, color: TeamColor) -> bool {
        king_in_check(&self.board, color)
    }

    /// No legal moves for `color`. Always false once a checkmate was recorded.
    pub fn is_in_stalemate(&self, color: TeamColor) -> bool {
        if self.checkmate_recorded {
            return false;
        }
        self.all_valid_moves(color).is_empty()
    }

    /// In check with no legal moves. A positive answer latches, so later
    /// stalemate queries on this game report false.
    pub fn is_in_checkmate(&mut self, color: TeamColor) -> bool {
        let checkmate = self.is_in_check(color) && self.is_in_stalemate(color);
        if checkmate {
            self.checkmate_recorded = true;
        }
        checkmate
    }
}

/// Whether any opposing piece attacks `color`'s king on `board`. A board with
/// no such king is never in check.
fn king_in_check(board: &ChessBoard, color: TeamColor) -> bool {
    let Some(king) = board.find_king(color) else {
        return false;
    };
    board
        .pieces()
        .filter(|(_, piece)| piece.team_color != color)
        .any(|(position, piece)| {
            piece
                .piece_moves(board, position)
                .iter()
                .any(|mv| mv.end == king)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::piece::{ChessPiece, PieceType};

    fn pos(row: u8, col: u8) -> ChessPosition {
        ChessPosition::new(row, col)
    }

    fn mv(from: (u8, u8), to: (u8, u8)) -> ChessMove {
        ChessMove::new(pos(from.0, from.1), pos(to.0, to.1), None)
    }

    fn board_with(pieces: &[(u8, u8, TeamColor, PieceType)]) -> ChessBoard {
        let mut board = ChessBoard::new();
        for &(row, col, color, piece_type) in pieces {
            board.add_piece(pos(row, col), Some(ChessPiece::new(color, piece_type)));
        }
        board
    }

    fn fools_mate() -> ChessGame {
        let mut game = ChessGame::new();
        game.make_move(mv((2, 6), (3, 6))).unwrap(); // f3
        game.make_move(mv((7, 5), (5, 5))).unwrap(); // e5
        game.make_move(mv((2, 7), (4, 7))).unwrap(); // g4
        game.make_move(mv((8, 4), (4, 8))).unwrap(); // Qh4#
        game
    }

    #[test]
    fn test_opening_move_counts() {
        let game = ChessGame::new();
        for col in 1..=8 {
            assert_eq!(game.valid_moves(pos(2, col)).len(), 2);
        }
        assert_eq!(game.valid_moves(pos(1, 2)).len(), 2);
        assert_eq!(game.valid_moves(pos(1, 7)).len(), 2);
        assert_eq!(game.all_valid_moves(TeamColor::White).len(), 20);
        assert_eq!(game.all_valid_moves(TeamColor::Black).len(), 20);
    }

    #[test]
    fn test_valid_moves_empty_square() {
        assert!(ChessGame::new().valid_moves(pos(4, 4)).is_empty());
    }

    #[test]
    fn test_pinned_piece_cannot_leave_the_line() {
        let board = board_with(&[
            (1, 5, TeamColor::White, PieceType::King),
            (2, 5, TeamColor::White, PieceType::Rook),
            (8, 5, TeamColor::Black, PieceType::Rook),
            (8, 1, TeamColor::Black, PieceType::King),
        ]);
        let game = ChessGame::with_board(board, TeamColor::White);
        let moves = game.valid_moves(pos(2, 5));
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|m| m.end.col() == 5));
        assert!(moves.contains(&mv((2, 5), (8, 5))));
    }

    #[test]
    fn test_valid_moves_never_leave_king_in_check() {
        let mut game = ChessGame::new();
        let line = [
            mv((2, 5), (4, 5)),
            mv((7, 4), (5, 4)),
            mv((1, 6), (5, 2)), // Bb5+
        ];
        for m in line {
            game.make_move(m).unwrap();
        }
        assert!(game.is_in_check(TeamColor::Black));
        let replies = game.all_valid_moves(TeamColor::Black);
        assert!(!replies.is_empty());
        for reply in &replies {
            let mut simulated = game.clone();
            simulated.make_move(*reply).unwrap();
            assert!(!simulated.is_in_check(TeamColor::Black), "{reply} leaves king in check");
        }
        // The pawn on a7 cannot ignore the check.
        assert!(game.valid_moves(pos(7, 1)).is_empty());
    }

    #[test]
    fn test_valid_moves_does_not_mutate_board() {
        let game = ChessGame::new();
        let before = game.clone();
        let _ = game.all_valid_moves(TeamColor::White);
        assert_eq!(game, before);
    }

    #[test]
    fn test_make_move_alternates_turns() {
        let mut game = ChessGame::new();
        let line = [
            mv((2, 5), (4, 5)),
            mv((7, 5), (5, 5)),
            mv((1, 7), (3, 6)),
            mv((8, 2), (6, 3)),
            mv((1, 6), (4, 3)),
        ];
        for (n, m) in line.into_iter().enumerate() {
            game.make_move(m).unwrap();
            let expected = if (n + 1) % 2 == 0 {
                TeamColor::White
            } else {
                TeamColor::Black
            };
            assert_eq!(game.team_turn(), expected);
        }
    }

    #[test]
    fn test_set_team_turn_hands_the_move_over() {
        let mut game = ChessGame::new();
        game.set_team_turn(TeamColor::Black);
        assert_eq!(
            game.make_move(mv((2, 5), (4, 5))),
            Err(InvalidMove::NotYourTurn(TeamColor::White))
        );
        game.make_move(mv((7, 5), (5, 5))).unwrap();
        assert_eq!(game.team_turn(), TeamColor::White);
    }

    #[test]
    fn test_make_move_rejections() {
        let mut game = ChessGame::new();
        assert_eq!(
            game.make_move(mv((4, 4), (5, 4))),
            Err(InvalidMove::NoPiece(pos(4, 4)))
        );
        assert_eq!(
            game.make_move(mv((7, 4), (5, 4))),
            Err(InvalidMove::NotYourTurn(TeamColor::Black))
        );
        assert_eq!(
            game.make_move(mv((2, 4), (5, 4))),
            Err(InvalidMove::IllegalMove(mv((2, 4), (5, 4))))
        );
        assert_eq!(game, ChessGame::new());
    }

    #[test]
    fn test_promotion_places_new_piece() {
        let board = board_with(&[
            (7, 3, TeamColor::White, PieceType::Pawn),
            (1, 5, TeamColor::White, PieceType::King),
            (8, 8, TeamColor::Black, PieceType::King),
        ]);
        let mut game = ChessGame::with_board(board, TeamColor::White);
        game.make_move(ChessMove::new(pos(7, 3), pos(8, 3), Some(PieceType::Queen)))
            .unwrap();
        assert_eq!(
            game.board().get_piece(pos(8, 3)),
            Some(ChessPiece::new(TeamColor::White, PieceType::Queen))
        );
        assert_eq!(game.board().get_piece(pos(7, 3)), None);
        assert!(game.is_in_check(TeamColor::Black));
    }

    #[test]
    fn test_promotion_requires_piece_choice() {
        let board = board_with(&[
            (7, 3, TeamColor::White, PieceType::Pawn),
            (1, 5, TeamColor::White, PieceType::King),
            (8, 8, TeamColor::Black, PieceType::King),
        ]);
        let mut game = ChessGame::with_board(board, TeamColor::White);
        assert!(matches!(
            game.make_move(mv((7, 3), (8, 3))),
            Err(InvalidMove::IllegalMove(_))
        ));
    }

    #[test]
    fn test_fools_mate_latches_checkmate() {
        let mut game = fools_mate();
        assert!(game.is_in_checkmate(TeamColor::White));
        assert!(game.is_in_check(TeamColor::White));
        assert!(game.all_valid_moves(TeamColor::White).is_empty());
        assert!(!game.is_in_stalemate(TeamColor::White));
        assert!(game.checkmate_recorded());
    }

    #[test]
    fn test_stalemate_before_checkmate_check() {
        let game = fools_mate();
        // Without the latch, "no legal moves" is all stalemate looks at.
        assert!(game.is_in_stalemate(TeamColor::White));
        assert!(!game.is_in_stalemate(TeamColor::Black));
    }

    #[test]
    fn test_real_stalemate() {
        let board = board_with(&[
            (8, 8, TeamColor::Black, PieceType::King),
            (6, 7, TeamColor::White, PieceType::Queen),
            (1, 1, TeamColor::White, PieceType::King),
        ]);
        let mut game = ChessGame::with_board(board, TeamColor::Black);
        assert!(!game.is_in_check(TeamColor::Black));
        assert!(!game.is_in_checkmate(TeamColor::Black));
        assert!(game.is_in_stalemate(TeamColor::Black));
        assert!(!game.is_in_stalemate(TeamColor::White));
    }

    #[test]
    fn test_missing_king_is_not_in_check() {
        let board = board_with(&[(4, 4, TeamColor::Black, PieceType::Queen)]);
        let game = ChessGame::with_board(board, TeamColor::White);
        assert!(!game.is_in_check(TeamColor::White));
    }

    #[test]
    fn test_game_round_trips_through_json() {
        let mut game = fools_mate();
        game.is_in_checkmate(TeamColor::White);
        let json = serde_json::to_string(&game).unwrap();
        let decoded: ChessGame = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, game);
        assert!(decoded.checkmate_recorded());
    }
}
