use serde::{Deserialize, Serialize};
use std::fmt;

use super::chess_move::ChessMove;
use super::piece::{ChessPiece, PieceType, TeamColor};

/// A square on the board, 1-based: row 1 is white's back rank, column 1 is file A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct ChessPosition {
    row: u8,
    col: u8,
}

#[derive(Deserialize)]
struct RawPosition {
    row: i64,
    col: i64,
}

#[derive(Debug, thiserror::Error)]
#[error("position ({row}, {col}) is off the board")]
pub struct PositionError {
    row: i64,
    col: i64,
}

impl TryFrom<RawPosition> for ChessPosition {
    type Error = PositionError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        let on_board = |v: i64| (1..=8).contains(&v);
        if on_board(raw.row) && on_board(raw.col) {
            Ok(ChessPosition {
                row: raw.row as u8,
                col: raw.col as u8,
            })
        } else {
            Err(PositionError {
                row: raw.row,
                col: raw.col,
            })
        }
    }
}

impl ChessPosition {
    /// Panics if either coordinate is outside 1..=8.
    pub const fn new(row: u8, col: u8) -> Self {
        assert!(row >= 1 && row <= 8 && col >= 1 && col <= 8, "position off the board");
        ChessPosition { row, col }
    }

    pub fn try_new(row: u8, col: u8) -> Option<Self> {
        ((1..=8).contains(&row) && (1..=8).contains(&col)).then_some(ChessPosition { row, col })
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn col(&self) -> u8 {
        self.col
    }

    /// The square `d_row` rows and `d_col` columns away, if it is still on the board.
    pub fn offset(&self, d_row: i8, d_col: i8) -> Option<Self> {
        let row = self.row as i8 + d_row;
        let col = self.col as i8 + d_col;
        if (1..=8).contains(&row) && (1..=8).contains(&col) {
            Some(ChessPosition {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    fn index(&self) -> (usize, usize) {
        (self.row as usize - 1, self.col as usize - 1)
    }
}

impl fmt::Display for ChessPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'A' + self.col - 1) as char;
        write!(f, "{}{}", file, self.row)
    }
}

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// An 8x8 grid of optional pieces. Cloning yields a fully independent board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChessBoard {
    squares: [[Option<ChessPiece>; 8]; 8],
}

impl Default for ChessBoard {
    fn default() -> Self {
        ChessBoard {
            squares: [[None; 8]; 8],
        }
    }
}

impl ChessBoard {
    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// A board holding the standard starting setup.
    pub fn standard() -> Self {
        let mut board = Self::new();
        board.reset_board();
        board
    }

    pub fn add_piece(&mut self, position: ChessPosition, piece: Option<ChessPiece>) {
        let (row, col) = position.index();
        self.squares[row][col] = piece;
    }

    pub fn get_piece(&self, position: ChessPosition) -> Option<ChessPiece> {
        let (row, col) = position.index();
        self.squares[row][col]
    }

    /// Clears the board and places both armies on their starting squares.
    pub fn reset_board(&mut self) {
        self.squares = [[None; 8]; 8];
        for (i, piece_type) in BACK_RANK.iter().enumerate() {
            let col = i as u8 + 1;
            self.add_piece(
                ChessPosition::new(1, col),
                Some(ChessPiece::new(TeamColor::White, *piece_type)),
            );
            self.add_piece(
                ChessPosition::new(2, col),
                Some(ChessPiece::new(TeamColor::White, PieceType::Pawn)),
            );
            self.add_piece(
                ChessPosition::new(7, col),
                Some(ChessPiece::new(TeamColor::Black, PieceType::Pawn)),
            );
            self.add_piece(
                ChessPosition::new(8, col),
                Some(ChessPiece::new(TeamColor::Black, *piece_type)),
            );
        }
    }

    /// Every occupied square with its piece, row by row from row 1.
    pub fn pieces(&self) -> impl Iterator<Item = (ChessPosition, ChessPiece)> + '_ {
        self.squares.iter().enumerate().flat_map(|(r, rank)| {
            rank.iter().enumerate().filter_map(move |(c, square)| {
                square.map(|piece| (ChessPosition::new(r as u8 + 1, c as u8 + 1), piece))
            })
        })
    }

    pub fn find_king(&self, color: TeamColor) -> Option<ChessPosition> {
        self.pieces()
            .find(|(_, piece)| piece.team_color == color && piece.piece_type == PieceType::King)
            .map(|(position, _)| position)
    }

    /// Moves whatever stands on `mv.start` to `mv.end`, promoting it when the move says so.
    /// No legality check happens here.
    pub fn apply_move(&mut self, mv: &ChessMove) {
        let Some(moving) = self.get_piece(mv.start) else {
            return;
        };
        let placed = match mv.promotion {
            Some(piece_type) => ChessPiece::new(moving.team_color, piece_type),
            None => moving,
        };
        self.add_piece(mv.end, Some(placed));
        self.add_piece(mv.start, None);
    }

    /// The piece-placement field of a FEN record, rank 8 first.
    pub fn to_placement(&self) -> String {
        let mut placement = String::with_capacity(72);
        for rank in self.squares.iter().rev() {
            let mut empty = 0;
            for square in rank {
                match square {
                    Some(piece) => {
                        if empty > 0 {
                            placement.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        placement.push(piece.symbol());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                placement.push(char::from(b'0' + empty));
            }
            placement.push('/');
        }
        placement.pop();
        placement
    }
}
