use crate::board::{Board, Color, Piece};
use crate::moves::king::KING_ATTACKS;
use crate::moves::knight::KNIGHT_ATTACKS;
use crate::moves::pawn::pawn_attacks;
use crate::moves::rays::{bishop_attacks, queen_attacks, rook_attacks};
use crate::moves::square_control::is_legal_castling;
use crate::moves::types::{Move, MoveBuffer, MoveFlag};
use crate::square::Square;
use crate::utils::pop_lsb;

const RANK_1: u64 = 0x0000_0000_0000_00FF;
const RANK_2: u64 = 0x0000_0000_0000_FF00;
const RANK_7: u64 = 0x00FF_0000_0000_0000;
const RANK_8: u64 = 0xFF00_0000_0000_0000;

// Squares between king and rook that must be empty.
const WHITE_KINGSIDE_BETWEEN: u64 = 0x0000_0000_0000_0060;
const WHITE_QUEENSIDE_BETWEEN: u64 = 0x0000_0000_0000_000E;
const BLACK_KINGSIDE_BETWEEN: u64 = 0x6000_0000_0000_0000;
const BLACK_QUEENSIDE_BETWEEN: u64 = 0x0E00_0000_0000_0000;

const PROMO_FLAGS: [MoveFlag; 4] = [
    MoveFlag::QueenPromotion,
    MoveFlag::KnightPromotion,
    MoveFlag::BishopPromotion,
    MoveFlag::RookPromotion,
];

/// Every pseudolegal move for the side to move.
pub fn generate_pseudo_legal(board: &Board, moves: &mut impl MoveBuffer) {
    moves.clear();
    generate_pawn_moves(board, moves, false);
    generate_knight_moves(board, moves, false);
    generate_slider_moves(board, Piece::Bishop, moves, false);
    generate_slider_moves(board, Piece::Rook, moves, false);
    generate_slider_moves(board, Piece::Queen, moves, false);
    generate_king_moves(board, moves, false);
}

/// Noisy moves only: captures, promotions and en passant (quiescence).
pub fn generate_pseudo_legal_captures(board: &Board, moves: &mut impl MoveBuffer) {
    moves.clear();
    generate_pawn_moves(board, moves, true);
    generate_knight_moves(board, moves, true);
    generate_slider_moves(board, Piece::Bishop, moves, true);
    generate_slider_moves(board, Piece::Rook, moves, true);
    generate_slider_moves(board, Piece::Queen, moves, true);
    generate_king_moves(board, moves, true);
}

#[inline(always)]
fn push_targets(from: u8, mut targets: u64, move_list: &mut impl MoveBuffer) {
    while targets != 0 {
        let to = pop_lsb(&mut targets);
        move_list.push(Move::new(
            Square::from_index(from),
            Square::from_index(to),
            MoveFlag::Normal,
        ));
    }
}

#[inline(always)]
fn push_promotions(from: u8, to: u8, move_list: &mut impl MoveBuffer) {
    for flag in PROMO_FLAGS {
        move_list.push(Move::new(
            Square::from_index(from),
            Square::from_index(to),
            flag,
        ));
    }
}

pub fn generate_knight_moves(board: &Board, move_list: &mut impl MoveBuffer, captures_only: bool) {
    let color = board.side_to_move;
    let friendly = board.occupancy(color);
    let enemy_king = board.pieces(Piece::King, color.opposite());
    let enemy = board.opponent_occupancy(color) & !enemy_king;

    let mut knights = board.pieces(Piece::Knight, color);
    while knights != 0 {
        let from = pop_lsb(&mut knights);
        let mut targets = KNIGHT_ATTACKS[from as usize] & !friendly & !enemy_king;
        if captures_only {
            targets &= enemy;
        }
        push_targets(from, targets, move_list);
    }
}

pub fn generate_slider_moves(
    board: &Board,
    piece: Piece,
    move_list: &mut impl MoveBuffer,
    captures_only: bool,
) {
    let color = board.side_to_move;
    let friendly = board.occupancy(color);
    let enemy_king = board.pieces(Piece::King, color.opposite());
    let enemy = board.opponent_occupancy(color) & !enemy_king;
    let blockers = board.occupied();

    let mut sliders = board.pieces(piece, color);
    while sliders != 0 {
        let from = pop_lsb(&mut sliders);
        let attacks = match piece {
            Piece::Bishop => bishop_attacks(from, blockers),
            Piece::Rook => rook_attacks(from, blockers),
            _ => queen_attacks(from, blockers),
        };
        let mut targets = attacks & !friendly & !enemy_king;
        if captures_only {
            targets &= enemy;
        }
        push_targets(from, targets, move_list);
    }
}

pub fn generate_king_moves(board: &Board, move_list: &mut impl MoveBuffer, captures_only: bool) {
    let color = board.side_to_move;
    let king_bb = board.pieces(Piece::King, color);
    if king_bb == 0 {
        return;
    }

    let from = king_bb.trailing_zeros() as u8;
    let friendly = board.occupancy(color);
    let enemy_king = board.pieces(Piece::King, color.opposite());
    let enemy = board.opponent_occupancy(color) & !enemy_king;

    let mut targets = KING_ATTACKS[from as usize] & !friendly & !enemy_king;
    if captures_only {
        targets &= enemy;
    }
    push_targets(from, targets, move_list);

    if captures_only {
        return;
    }

    let occupied = board.occupied();
    let (kingside_between, queenside_between) = match color {
        Color::White => (WHITE_KINGSIDE_BETWEEN, WHITE_QUEENSIDE_BETWEEN),
        Color::Black => (BLACK_KINGSIDE_BETWEEN, BLACK_QUEENSIDE_BETWEEN),
    };

    if board.has_kingside_castle(color) && occupied & kingside_between == 0 {
        let mv = Move::new(
            Square::from_index(from),
            Square::from_index(from + 2),
            MoveFlag::Castling,
        );
        if is_legal_castling(board, mv) {
            move_list.push(mv);
        }
    }

    if board.has_queenside_castle(color) && occupied & queenside_between == 0 {
        let mv = Move::new(
            Square::from_index(from),
            Square::from_index(from - 2),
            MoveFlag::Castling,
        );
        if is_legal_castling(board, mv) {
            move_list.push(mv);
        }
    }
}

pub fn generate_pawn_moves(board: &Board, move_list: &mut impl MoveBuffer, captures_only: bool) {
    let color = board.side_to_move;
    let pawns = board.pieces(Piece::Pawn, color);
    let enemy_king = board.pieces(Piece::King, color.opposite());
    let enemy = board.opponent_occupancy(color) & !enemy_king;
    let empty = !board.occupied();

    let (start_rank, promo_rank) = match color {
        Color::White => (RANK_7, RANK_8),
        Color::Black => (RANK_2, RANK_1),
    };

    // ===== Captures (non-promoting) =====
    let mut attackers = pawns & !start_rank;
    while attackers != 0 {
        let from = pop_lsb(&mut attackers);
        let mut targets = pawn_attacks(from, color) & enemy & !promo_rank;
        while targets != 0 {
            let to = pop_lsb(&mut targets);
            move_list.push(Move::new(
                Square::from_index(from),
                Square::from_index(to),
                MoveFlag::Normal,
            ));
        }
    }

    // ===== Promotion captures =====
    let mut promoters = pawns & start_rank;
    while promoters != 0 {
        let from = pop_lsb(&mut promoters);
        let mut targets = pawn_attacks(from, color) & enemy & promo_rank;
        while targets != 0 {
            let to = pop_lsb(&mut targets);
            push_promotions(from, to, move_list);
        }
    }

    // ===== Promotion pushes =====
    let promo_pushes = match color {
        Color::White => ((pawns & start_rank) << 8) & empty,
        Color::Black => ((pawns & start_rank) >> 8) & empty,
    };
    let mut bb = promo_pushes;
    while bb != 0 {
        let to = pop_lsb(&mut bb);
        let from = match color {
            Color::White => to - 8,
            Color::Black => to + 8,
        };
        push_promotions(from, to, move_list);
    }

    // ===== En passant =====
    if let Some(ep) = board.en_passant {
        let ep_idx = ep.index();
        let mut attackers = pawns;
        while attackers != 0 {
            let from = pop_lsb(&mut attackers);
            if pawn_attacks(from, color) & ep.bb() != 0 {
                move_list.push(Move::new(
                    Square::from_index(from),
                    Square::from_index(ep_idx),
                    MoveFlag::EnPassant,
                ));
            }
        }
    }

    if captures_only {
        return;
    }

    // ===== Single pushes (non-promoting) =====
    let single_pushes = match color {
        Color::White => ((pawns << 8) & empty) & !promo_rank,
        Color::Black => ((pawns >> 8) & empty) & !promo_rank,
    };
    let mut bb = single_pushes;
    while bb != 0 {
        let to = pop_lsb(&mut bb);
        let from = match color {
            Color::White => to - 8,
            Color::Black => to + 8,
        };
        move_list.push(Move::new(
            Square::from_index(from),
            Square::from_index(to),
            MoveFlag::Normal,
        ));
    }

    // ===== Double pushes =====
    let double_pushes = match color {
        Color::White => ((((pawns & RANK_2) << 8) & empty) << 8) & empty,
        Color::Black => ((((pawns & RANK_7) >> 8) & empty) >> 8) & empty,
    };
    let mut bb = double_pushes;
    while bb != 0 {
        let to = pop_lsb(&mut bb);
        let from = match color {
            Color::White => to - 16,
            Color::Black => to + 16,
        };
        move_list.push(Move::new(
            Square::from_index(from),
            Square::from_index(to),
            MoveFlag::PawnTwoUp,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::types::MoveList;
    use std::str::FromStr;

    fn moves_of(fen: &str) -> MoveList {
        let board = Board::from_str(fen).unwrap();
        let mut moves = MoveList::new();
        generate_pseudo_legal(&board, &mut moves);
        moves
    }

    #[test]
    fn startpos_has_twenty_pseudolegal_moves() {
        let moves = moves_of("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        assert_eq!(moves.len(), 20);
    }

    #[test]
    fn promotions_expand_to_four_moves() {
        let moves = moves_of("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        let promos: Vec<_> = moves.iter().filter(|m| m.is_promotion()).collect();
        assert_eq!(promos.len(), 4);
    }

    #[test]
    fn en_passant_is_generated_when_capturable() {
        let moves = moves_of("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1");
        assert!(moves.iter().any(|m| m.is_en_passant()));
    }

    #[test]
    fn captures_only_yields_noisy_moves() {
        let board =
            Board::from_str("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4")
                .unwrap();
        let mut noisy = MoveList::new();
        generate_pseudo_legal_captures(&board, &mut noisy);
        assert!(!noisy.is_empty());
        for mv in &noisy {
            assert!(
                board.is_capture(*mv) || mv.is_promotion(),
                "quiet move in capture generation: {}",
                mv
            );
        }
    }

    #[test]
    fn castling_requires_safe_path() {
        // black rook on f8 covers f1: kingside castling is gone, queenside stays
        let moves = moves_of("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!moves.iter().any(|m| m.to_uci() == "e1g1"));
        assert!(moves.iter().any(|m| m.to_uci() == "e1c1"));
    }

    #[test]
    fn castling_requires_empty_path() {
        let moves = moves_of("4k3/8/8/8/8/8/8/R2QK2R w KQ - 0 1");
        assert!(moves.iter().any(|m| m.to_uci() == "e1g1"));
        assert!(!moves.iter().any(|m| m.to_uci() == "e1c1"));
    }
}
