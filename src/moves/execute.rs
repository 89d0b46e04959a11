use crate::board::{Board, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, Piece, Undo};
use crate::hash::zobrist::zobrist_keys;
use crate::moves::movegen::generate_pseudo_legal;
use crate::moves::square_control::in_check;
use crate::moves::types::{MOVE_NONE, Move, MoveBuffer};
use crate::square::Square;

/// Rook source and destination for each castling king destination.
#[inline(always)]
fn rook_castle_squares(king_to: u8) -> Option<(u8, u8)> {
    match king_to {
        6 => Some((7, 5)),    // white O-O
        2 => Some((0, 3)),    // white O-O-O
        62 => Some((63, 61)), // black O-O
        58 => Some((56, 59)), // black O-O-O
        _ => None,
    }
}

#[inline(always)]
fn rights_cleared_by_rook(color: Color, rook_sq: u8) -> u8 {
    match (color, rook_sq) {
        (Color::White, 0) => CASTLE_WQ,
        (Color::White, 7) => CASTLE_WK,
        (Color::Black, 56) => CASTLE_BQ,
        (Color::Black, 63) => CASTLE_BK,
        _ => 0,
    }
}

#[inline(always)]
fn remove_piece(board: &mut Board, color: Color, piece: Piece, idx: u8) {
    let new_bb = board.bb(color, piece) & !(1u64 << idx);
    board.set_bb(color, piece, new_bb);
}

#[inline(always)]
fn place_piece(board: &mut Board, color: Color, piece: Piece, idx: u8) {
    let new_bb = board.bb(color, piece) | (1u64 << idx);
    board.set_bb(color, piece, new_bb);
}

/// Apply `mv`. Returns false (and leaves the board unchanged) when the move
/// would leave the mover's own king in check.
pub fn make_move(board: &mut Board, mv: Move) -> bool {
    let mover = board.side_to_move;
    let from = mv.from();
    let to = mv.to();
    let from_idx = from.index();
    let to_idx = to.index();

    let Some(piece) = board.piece_type_at(from) else {
        return false;
    };

    let captured = if mv.is_en_passant() {
        Some(Piece::Pawn)
    } else {
        board.piece_type_at(to)
    };

    board.push_undo(Undo {
        mv,
        captured,
        castling_rights: board.castling_rights,
        en_passant: board.en_passant,
        halfmove_clock: board.halfmove_clock,
        zobrist: board.zobrist,
    });

    let keys = zobrist_keys();

    if let Some(ep) = board.en_passant {
        board.zobrist ^= keys.ep_file[ep.file() as usize];
    }
    board.en_passant = None;

    // Piece mutations: clear source and victim, fill destination.
    remove_piece(board, mover, piece, from_idx);
    if mv.is_en_passant() {
        let victim_sq = match mover {
            Color::White => to_idx - 8,
            Color::Black => to_idx + 8,
        };
        remove_piece(board, mover.opposite(), Piece::Pawn, victim_sq);
    } else if let Some(victim) = captured {
        remove_piece(board, mover.opposite(), victim, to_idx);
    }

    match mv.promotion() {
        Some(promoted) => place_piece(board, mover, promoted, to_idx),
        None => place_piece(board, mover, piece, to_idx),
    }

    if mv.is_castling()
        && let Some((rook_from, rook_to)) = rook_castle_squares(to_idx)
    {
        remove_piece(board, mover, Piece::Rook, rook_from);
        place_piece(board, mover, Piece::Rook, rook_to);
    }

    // Castling rights weaken when a king moves, a rook leaves its corner,
    // or a rook is captured on its corner.
    let mut cleared = 0u8;
    if piece == Piece::King {
        cleared |= match mover {
            Color::White => CASTLE_WK | CASTLE_WQ,
            Color::Black => CASTLE_BK | CASTLE_BQ,
        };
    }
    if piece == Piece::Rook {
        cleared |= rights_cleared_by_rook(mover, from_idx);
    }
    if captured == Some(Piece::Rook) {
        cleared |= rights_cleared_by_rook(mover.opposite(), to_idx);
    }
    let new_rights = board.castling_rights & !cleared;
    if new_rights != board.castling_rights {
        board.zobrist ^= keys.castling[(board.castling_rights & 0xF) as usize];
        board.zobrist ^= keys.castling[(new_rights & 0xF) as usize];
        board.castling_rights = new_rights;
    }

    if captured.is_some() || piece == Piece::Pawn {
        board.halfmove_clock = 0;
    } else {
        board.halfmove_clock += 1;
    }
    if mover == Color::Black {
        board.fullmove_number += 1;
    }

    board.side_to_move = mover.opposite();
    board.zobrist ^= keys.side_to_move;

    // A double push yields an en-passant target only while some enemy pawn
    // stands beside the arrival square; a dead target would split hashes.
    if mv.is_pawn_two_up() && board.ep_capturable(to, mover.opposite()) {
        let ep_idx = match mover {
            Color::White => to_idx - 8,
            Color::Black => to_idx + 8,
        };
        let ep = Square::from_index(ep_idx);
        board.en_passant = Some(ep);
        board.zobrist ^= keys.ep_file[ep.file() as usize];
    }

    if in_check(board, mover) {
        undo_move(board);
        return false;
    }

    #[cfg(debug_assertions)]
    board.assert_hash();

    true
}

/// Reverse the most recent `make_move`. The board must come back
/// bit-identical to its pre-make state.
pub fn undo_move(board: &mut Board) {
    let undo = board.pop_undo();
    let mv = undo.mv;
    debug_assert!(mv != MOVE_NONE, "null moves unwind via undo_null_move");

    let mover = board.side_to_move.opposite();
    board.side_to_move = mover;
    if mover == Color::Black {
        board.fullmove_number -= 1;
    }

    let from_idx = mv.from().index();
    let to_idx = mv.to().index();

    if let Some(promoted) = mv.promotion() {
        remove_piece(board, mover, promoted, to_idx);
        place_piece(board, mover, Piece::Pawn, from_idx);
        if let Some(victim) = undo.captured {
            place_piece(board, mover.opposite(), victim, to_idx);
        }
    } else if mv.is_castling() {
        remove_piece(board, mover, Piece::King, to_idx);
        place_piece(board, mover, Piece::King, from_idx);
        if let Some((rook_from, rook_to)) = rook_castle_squares(to_idx) {
            remove_piece(board, mover, Piece::Rook, rook_to);
            place_piece(board, mover, Piece::Rook, rook_from);
        }
    } else if mv.is_en_passant() {
        remove_piece(board, mover, Piece::Pawn, to_idx);
        place_piece(board, mover, Piece::Pawn, from_idx);
        let victim_sq = match mover {
            Color::White => to_idx - 8,
            Color::Black => to_idx + 8,
        };
        place_piece(board, mover.opposite(), Piece::Pawn, victim_sq);
    } else {
        let piece = board
            .piece_type_at(mv.to())
            .expect("moved piece missing during unmake");
        remove_piece(board, mover, piece, to_idx);
        place_piece(board, mover, piece, from_idx);
        if let Some(victim) = undo.captured {
            place_piece(board, mover.opposite(), victim, to_idx);
        }
    }

    board.castling_rights = undo.castling_rights;
    board.en_passant = undo.en_passant;
    board.halfmove_clock = undo.halfmove_clock;
    board.zobrist = undo.zobrist;
}

/// Pass the turn: flip side to move and drop the en-passant target.
/// Never nested, never made while in check (the search guarantees both).
pub fn make_null_move(board: &mut Board) {
    board.push_undo(Undo {
        mv: MOVE_NONE,
        captured: None,
        castling_rights: board.castling_rights,
        en_passant: board.en_passant,
        halfmove_clock: board.halfmove_clock,
        zobrist: board.zobrist,
    });

    let keys = zobrist_keys();
    if let Some(ep) = board.en_passant {
        board.zobrist ^= keys.ep_file[ep.file() as usize];
    }
    board.en_passant = None;

    board.side_to_move = board.side_to_move.opposite();
    board.zobrist ^= keys.side_to_move;
}

pub fn undo_null_move(board: &mut Board) {
    let undo = board.pop_undo();
    debug_assert!(undo.mv == MOVE_NONE, "expected a null-move record");

    board.side_to_move = board.side_to_move.opposite();
    board.en_passant = undo.en_passant;
    board.halfmove_clock = undo.halfmove_clock;
    board.zobrist = undo.zobrist;
}

/// Filter pseudolegal moves through make/unmake. `scratch` holds the
/// pseudolegal list so callers can reuse buffers across plies.
pub fn generate_legal(
    board: &mut Board,
    moves: &mut impl MoveBuffer,
    scratch: &mut impl MoveBuffer,
) {
    generate_pseudo_legal(board, scratch);
    moves.clear();
    for i in 0..scratch.len() {
        let mv = scratch[i];
        if make_move(board, mv) {
            undo_move(board);
            moves.push(mv);
        }
    }
}
