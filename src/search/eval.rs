use crate::board::{Board, Color, Piece};

/// Static evaluation in centipawns, positive for the side to move.
/// Implementations must be pure with respect to the board state.
pub trait Evaluate {
    fn evaluate(&self, board: &Board) -> i32;
}

const MATERIAL: [i32; 6] = [100, 302, 320, 500, 900, 0];

/// Plain material count. A stand-in for a real evaluation network; the
/// search depends only on the trait contract.
pub struct MaterialEvaluator;

impl Evaluate for MaterialEvaluator {
    fn evaluate(&self, board: &Board) -> i32 {
        let mut score = 0;
        for piece in [
            Piece::Pawn,
            Piece::Knight,
            Piece::Bishop,
            Piece::Rook,
            Piece::Queen,
        ] {
            let diff = board.bb(Color::White, piece).count_ones() as i32
                - board.bb(Color::Black, piece).count_ones() as i32;
            score += MATERIAL[piece as usize] * diff;
        }
        match board.side_to_move {
            Color::White => score,
            Color::Black => -score,
        }
    }
}
