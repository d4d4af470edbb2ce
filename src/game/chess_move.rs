use serde::{Deserialize, Serialize};
use std::fmt;

use super::board::ChessPosition;
use super::piece::PieceType;

/// A move from one square to another, with the piece a pawn becomes when it
/// reaches the far rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChessMove {
    #[serde(rename = "startPosition")]
    pub start: ChessPosition,
    #[serde(rename = "endPosition")]
    pub end: ChessPosition,
    #[serde(rename = "promotionPiece", default)]
    pub promotion: Option<PieceType>,
}

impl ChessMove {
    pub fn new(start: ChessPosition, end: ChessPosition, promotion: Option<PieceType>) -> Self {
        ChessMove {
            start,
            end,
            promotion,
        }
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)?;
        if let Some(promotion) = self.promotion {
            write!(f, "={:?}", promotion)?;
        }
        Ok(())
    }
}
