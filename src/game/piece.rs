use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::board::{ChessBoard, ChessPosition};
use super::chess_move::ChessMove;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeamColor {
    White,
    Black,
}

impl TeamColor {
    pub fn opponent(self) -> TeamColor {
        match self {
            TeamColor::White => TeamColor::Black,
            TeamColor::Black => TeamColor::White,
        }
    }
}

impl fmt::Display for TeamColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamColor::White => f.write_str("white"),
            TeamColor::Black => f.write_str("black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PieceType {
    King,
    Queen,
    Bishop,
    Knight,
    Rook,
    Pawn,
}

/// Pieces a pawn may become on the far rank.
pub const PROMOTIONS: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];
const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChessPiece {
    pub team_color: TeamColor,
    pub piece_type: PieceType,
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceType::King => "king",
            PieceType::Queen => "queen",
            PieceType::Bishop => "bishop",
            PieceType::Knight => "knight",
            PieceType::Rook => "rook",
            PieceType::Pawn => "pawn",
        };
        f.write_str(name)
    }
}

impl ChessPiece {
    pub fn new(team_color: TeamColor, piece_type: PieceType) -> Self {
        ChessPiece {
            team_color,
            piece_type,
        }
    }

    /// FEN letter: uppercase for white, lowercase for black.
    pub fn symbol(&self) -> char {
        let letter = match self.piece_type {
            PieceType::King => 'k',
            PieceType::Queen => 'q',
            PieceType::Bishop => 'b',
            PieceType::Knight => 'n',
            PieceType::Rook => 'r',
            PieceType::Pawn => 'p',
        };
        match self.team_color {
            TeamColor::White => letter.to_ascii_uppercase(),
            TeamColor::Black => letter,
        }
    }

    /// Every move this piece could make from `from`, ignoring whether it would
    /// leave its own king in check.
    pub fn piece_moves(&self, board: &ChessBoard, from: ChessPosition) -> HashSet<ChessMove> {
        let mut moves = HashSet::new();
        match self.piece_type {
            PieceType::Pawn => self.pawn_moves(board, from, &mut moves),
            PieceType::Rook => self.slide(board, from, &ROOK_DIRECTIONS, &mut moves),
            PieceType::Bishop => self.slide(board, from, &BISHOP_DIRECTIONS, &mut moves),
            PieceType::Queen => {
                self.slide(board, from, &ROOK_DIRECTIONS, &mut moves);
                self.slide(board, from, &BISHOP_DIRECTIONS, &mut moves);
            }
            PieceType::Knight => self.step(board, from, &KNIGHT_OFFSETS, &mut moves),
            PieceType::King => self.step(board, from, &KING_OFFSETS, &mut moves),
        }
        moves
    }

    fn slide(
        &self,
        board: &ChessBoard,
        from: ChessPosition,
        directions: &[(i8, i8)],
        moves: &mut HashSet<ChessMove>,
    ) {
        for &(d_row, d_col) in directions {
            let mut current = from;
            while let Some(next) = current.offset(d_row, d_col) {
                match board.get_piece(next) {
                    None => {
                        moves.insert(ChessMove::new(from, next, None));
                        current = next;
                    }
                    Some(blocker) => {
                        if blocker.team_color != self.team_color {
                            moves.insert(ChessMove::new(from, next, None));
                        }
                        break;
                    }
                }
            }
        }
    }

    fn step(
        &self,
        board: &ChessBoard,
        from: ChessPosition,
        offsets: &[(i8, i8)],
        moves: &mut HashSet<ChessMove>,
    ) {
        for target in offsets.iter().filter_map(|&(r, c)| from.offset(r, c)) {
            let own_piece = board
                .get_piece(target)
                .is_some_and(|occupant| occupant.team_color == self.team_color);
            if !own_piece {
                moves.insert(ChessMove::new(from, target, None));
            }
        }
    }

    fn pawn_moves(&self, board: &ChessBoard, from: ChessPosition, moves: &mut HashSet<ChessMove>) {
        let (direction, start_row) = match self.team_color {
            TeamColor::White => (1, 2),
            TeamColor::Black => (-1, 7),
        };

        if let Some(forward) = from.offset(direction, 0) {
            if board.get_piece(forward).is_none() {
                self.push_pawn_move(from, forward, moves);
                if from.row() == start_row {
                    if let Some(double) = from.offset(2 * direction, 0) {
                        if board.get_piece(double).is_none() {
                            moves.insert(ChessMove::new(from, double, None));
                        }
                    }
                }
            }
        }

        for d_col in [-1, 1] {
            let Some(target) = from.offset(direction, d_col) else {
                continue;
            };
            let capturable = board
                .get_piece(target)
                .is_some_and(|occupant| occupant.team_color != self.team_color);
            if capturable {
                self.push_pawn_move(from, target, moves);
            }
        }
    }

    fn push_pawn_move(&self, from: ChessPosition, to: ChessPosition, moves: &mut HashSet<ChessMove>) {
        let far_rank = match self.team_color {
            TeamColor::White => 8,
            TeamColor::Black => 1,
        };
        if to.row() == far_rank {
            for promotion in PROMOTIONS {
                moves.insert(ChessMove::new(from, to, Some(promotion)));
            }
        } else {
            moves.insert(ChessMove::new(from, to, None));
        }
    }
}
