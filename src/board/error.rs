use std::fmt;

use super::Color;

/// FEN parsing failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// Fewer than the four mandatory fields.
    TooFewFields { found: usize },
    /// Unknown glyph in the piece placement field.
    InvalidPiece { glyph: char },
    /// A rank ran past the h-file, or there were not exactly eight ranks.
    BadRankLayout,
    /// Side-to-move field was not "w" or "b".
    InvalidSideToMove { found: String },
    /// Castling field held something other than KQkq or "-".
    InvalidCastling { glyph: char },
    /// En-passant field was neither "-" nor a square.
    InvalidEnPassant { found: String },
    /// Halfmove clock or fullmove number did not parse.
    InvalidCounter { found: String },
    /// A side has no king (or more than one).
    BadKingCount { color: Color },
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::TooFewFields { found } => {
                write!(f, "FEN needs at least 4 fields, found {found}")
            }
            FenError::InvalidPiece { glyph } => {
                write!(f, "invalid piece character '{glyph}' in FEN")
            }
            FenError::BadRankLayout => {
                write!(f, "FEN piece placement does not describe 8x8 ranks")
            }
            FenError::InvalidSideToMove { found } => {
                write!(f, "invalid side to move '{found}', expected 'w' or 'b'")
            }
            FenError::InvalidCastling { glyph } => {
                write!(f, "invalid castling character '{glyph}' in FEN")
            }
            FenError::InvalidEnPassant { found } => {
                write!(f, "invalid en passant square '{found}'")
            }
            FenError::InvalidCounter { found } => {
                write!(f, "invalid move counter '{found}' in FEN")
            }
            FenError::BadKingCount { color } => {
                write!(f, "{color:?} must have exactly one king")
            }
        }
    }
}

impl std::error::Error for FenError {}
