use lumen::board::Board;
use lumen::moves::execute::generate_legal;
use lumen::moves::movegen::{generate_pseudo_legal, generate_pseudo_legal_captures};
use lumen::moves::square_control::in_check;
use lumen::moves::types::{Move, MoveList};
use std::str::FromStr;

fn legal_moves(fen: &str) -> Vec<Move> {
    let mut board = Board::from_str(fen).unwrap();
    let mut legal = Vec::new();
    let mut scratch = Vec::new();
    generate_legal(&mut board, &mut legal, &mut scratch);
    legal
}

fn contains(moves: &[Move], uci: &str) -> bool {
    moves.iter().any(|m| m.to_uci() == uci)
}

#[test]
fn startpos_has_twenty_legal_moves() {
    assert_eq!(legal_moves(lumen::board::START_FEN).len(), 20);
}

#[test]
fn kiwipete_has_forty_eight_legal_moves() {
    let moves =
        legal_moves("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
    assert_eq!(moves.len(), 48);
}

#[test]
fn pinned_pieces_cannot_expose_the_king() {
    // knight on e3 is pinned against e1 by the e8 rook
    let moves = legal_moves("4r1k1/8/8/8/8/4N3/8/4K3 w - - 0 1");
    assert!(!moves.iter().any(|m| m.from().to_string() == "e3"));
}

#[test]
fn evasions_only_while_in_check() {
    let fen = "4k3/8/8/8/8/8/4r3/4K3 w - - 0 1";
    let mut board = Board::from_str(fen).unwrap();
    assert!(in_check(&board, board.side_to_move));

    let mut legal = Vec::new();
    let mut scratch = Vec::new();
    generate_legal(&mut board, &mut legal, &mut scratch);
    // Kd1, Kf1, Kxe2 only; d2/f2 stay covered by the rook
    assert_eq!(legal.len(), 3);
    assert!(contains(&legal, "e1e2"));
}

#[test]
fn promotion_moves_cover_all_four_pieces() {
    let moves = legal_moves("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
    for uci in ["a7a8q", "a7a8r", "a7a8b", "a7a8n"] {
        assert!(contains(&moves, uci), "missing {}", uci);
    }
}

#[test]
fn underpromotion_capture_is_generated() {
    let moves = legal_moves("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1");
    assert!(contains(&moves, "a7b8n"));
    assert!(contains(&moves, "a7a8q"));
}

#[test]
fn en_passant_is_legal_only_when_king_stays_safe() {
    // taking en passant would expose the king along the fifth rank
    let moves = legal_moves("8/8/8/K2pP2r/8/8/8/4k3 w - d6 0 1");
    assert!(
        !contains(&moves, "e5d6"),
        "ep capture must be rejected, it uncovers the rank pin"
    );
}

#[test]
fn castling_blocked_by_own_pieces() {
    let moves = legal_moves("4k3/8/8/8/8/8/8/RN2K2R w KQ - 0 1");
    assert!(contains(&moves, "e1g1"));
    assert!(!contains(&moves, "e1c1"));
}

#[test]
fn no_castling_out_of_check() {
    let moves = legal_moves("4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1");
    assert!(!contains(&moves, "e1g1"));
    assert!(!contains(&moves, "e1c1"));
}

#[test]
fn captures_only_generation_is_a_subset_of_all_moves() {
    let board =
        Board::from_str("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();
    let mut all = MoveList::new();
    generate_pseudo_legal(&board, &mut all);
    let mut noisy = MoveList::new();
    generate_pseudo_legal_captures(&board, &mut noisy);

    assert!(!noisy.is_empty());
    for mv in &noisy {
        assert!(all.contains(mv), "{} missing from full generation", mv);
        assert!(board.is_capture(*mv) || mv.is_promotion());
    }
}
