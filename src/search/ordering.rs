use crate::board::{Board, Piece};
use crate::moves::types::{MAX_MOVES, MOVE_NONE, Move};
use crate::search::context::SearchContext;
use crate::search::see::{SeeExt, see_value};
use arrayvec::ArrayVec;

pub type ScoreList = ArrayVec<i32, MAX_MOVES>;

// Score bands, descending. Quiets score their (clamped) history value and
// therefore always land between the counter-move and bad-capture bands.
pub const HASH_MOVE_SCORE: i32 = i32::MAX;
pub const GOOD_CAPTURE_SCORE: i32 = 1_500_000_000;
pub const PROMOTION_SCORE: i32 = 1_000_000_000;
pub const KILLER_SCORE: i32 = 500_000_000;
pub const COUNTER_MOVE_SCORE: i32 = 250_000_000;
pub const BAD_CAPTURE_SCORE: i32 = -500_000_000;

/// Most-valuable-victim / least-valuable-attacker. Captures only.
#[inline]
pub fn mvv_lva(board: &Board, mv: Move) -> i32 {
    let victim = if mv.is_en_passant() {
        Piece::Pawn
    } else {
        match board.piece_type_at(mv.to()) {
            Some(piece) => piece,
            None => return 0,
        }
    };
    let attacker = board.piece_type_at(mv.from()).unwrap_or(Piece::Pawn);
    100 * see_value(victim) - see_value(attacker)
}

/// Score every generated move into a parallel array for sort-on-demand.
pub fn score_moves(
    board: &Board,
    ctx: &SearchContext,
    moves: &[Move],
    tt_move: Move,
    ply: usize,
) -> ScoreList {
    let stm = board.side_to_move;
    let [killer_one, killer_two] = ctx.killers(ply);
    let counter = match board.last_move() {
        Some(prev) if prev != MOVE_NONE => ctx.counter_move(stm.opposite(), prev),
        _ => MOVE_NONE,
    };

    let mut scores = ScoreList::new();
    for &mv in moves {
        let score = if mv == tt_move && mv != MOVE_NONE {
            HASH_MOVE_SCORE
        } else if board.is_capture(mv) {
            if board.static_exchange_eval(mv, 0) {
                GOOD_CAPTURE_SCORE + mvv_lva(board, mv)
            } else {
                BAD_CAPTURE_SCORE + mvv_lva(board, mv)
            }
        } else if mv.is_promotion() {
            PROMOTION_SCORE
        } else if mv == killer_one {
            KILLER_SCORE + 1
        } else if mv == killer_two {
            KILLER_SCORE
        } else if mv == counter && counter != MOVE_NONE {
            COUNTER_MOVE_SCORE
        } else {
            let piece = board.piece_type_at(mv.from()).unwrap_or(Piece::Pawn);
            ctx.history_score(stm, piece, mv.to())
        };
        scores.push(score);
    }
    scores
}

/// One selection-sort step: move the best-scored remaining entry to slot `i`
/// and return it. Sorting only as deep as the search actually iterates.
#[inline]
pub fn pick_move(moves: &mut [Move], scores: &mut [i32], i: usize) -> Move {
    let mut best = i;
    for j in (i + 1)..moves.len() {
        if scores[j] > scores[best] {
            best = j;
        }
    }
    moves.swap(i, best);
    scores.swap(i, best);
    moves[i]
}
