use lumen::board::{Board, CASTLE_WK, CASTLE_WQ, Color, Piece};
use lumen::moves::execute::{generate_legal, make_move, make_null_move, undo_move, undo_null_move};
use lumen::moves::types::Move;
use lumen::square::Square;
use std::str::FromStr;

fn uci(board: &Board, s: &str) -> Move {
    Move::from_uci(board, s).expect("parsable move")
}

fn play(board: &mut Board, s: &str) {
    let mv = uci(board, s);
    assert!(make_move(board, mv), "move {} should be legal", s);
}

#[test]
fn double_push_without_adjacent_pawn_sets_no_ep_target() {
    let mut board = Board::from_str("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
    play(&mut board, "e2e4");
    assert_eq!(board.en_passant, None);
    assert!(board.to_fen().contains(" - "));
}

#[test]
fn double_push_with_adjacent_enemy_pawn_sets_ep_target() {
    let mut board = Board::from_str("4k3/8/8/3p4/8/8/4P3/4K3 w - - 0 1").unwrap();
    play(&mut board, "e2e4");
    assert_eq!(board.en_passant, Square::parse("e3"));
    let fen = board.to_fen();
    assert!(fen.contains(" e3 "), "fen was {}", fen);
}

#[test]
fn clocks_and_side_after_three_opening_moves() {
    let mut board = Board::new();
    play(&mut board, "e2e4");
    play(&mut board, "e7e5");
    play(&mut board, "g1f3");
    assert_eq!(board.halfmove_clock, 1);
    assert_eq!(board.fullmove_number, 2);
    assert_eq!(board.side_to_move, Color::Black);
}

#[test]
fn kingside_castle_moves_rook_and_clears_rights() {
    let mut board = Board::from_str("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    play(&mut board, "e1g1");

    assert_eq!(
        board.piece_at(Square::parse("g1").unwrap()),
        Some((Color::White, Piece::King))
    );
    assert_eq!(
        board.piece_at(Square::parse("f1").unwrap()),
        Some((Color::White, Piece::Rook))
    );
    assert_eq!(board.piece_at(Square::parse("h1").unwrap()), None);
    assert_eq!(board.castling_rights & (CASTLE_WK | CASTLE_WQ), 0);
}

#[test]
fn en_passant_capture_removes_the_passed_pawn() {
    let mut board = Board::from_str("4k3/8/8/4Pp2/8/8/8/4K3 w - f6 0 1").unwrap();
    play(&mut board, "e5f6");

    assert_eq!(
        board.piece_at(Square::parse("f6").unwrap()),
        Some((Color::White, Piece::Pawn))
    );
    assert_eq!(board.piece_at(Square::parse("f5").unwrap()), None);
    assert_eq!(board.piece_at(Square::parse("e5").unwrap()), None);
}

#[test]
fn rook_capture_on_corner_clears_opponent_right() {
    let mut board = Board::from_str("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    play(&mut board, "a1a8");
    // black queenside right is gone, kingside survives
    assert!(!board.has_queenside_castle(Color::Black));
    assert!(board.has_kingside_castle(Color::Black));
}

#[test]
fn illegal_move_returns_false_and_leaves_board_unchanged() {
    // the e-file knight is pinned by the rook
    let mut board = Board::from_str("4r1k1/8/8/8/8/4N3/8/4K3 w - - 0 1").unwrap();
    let before_fen = board.to_fen();
    let before_hash = board.zobrist;
    let before_history = board.history_len();

    let mv = uci(&board, "e3c4");
    assert!(!make_move(&mut board, mv));

    assert_eq!(board.to_fen(), before_fen);
    assert_eq!(board.zobrist, before_hash);
    assert_eq!(board.history_len(), before_history);
}

#[test]
fn promotion_with_capture_round_trips() {
    let mut board = Board::from_str("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let before_fen = board.to_fen();
    let before_hash = board.zobrist;

    let mv = uci(&board, "a7b8q");
    assert!(make_move(&mut board, mv));
    assert_eq!(
        board.piece_at(Square::parse("b8").unwrap()),
        Some((Color::White, Piece::Queen))
    );

    undo_move(&mut board);
    assert_eq!(board.to_fen(), before_fen);
    assert_eq!(board.zobrist, before_hash);
    assert_eq!(
        board.piece_at(Square::parse("b8").unwrap()),
        Some((Color::Black, Piece::Knight))
    );
}

#[test]
fn every_legal_move_round_trips_bit_identically() {
    let fens = [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1",
    ];

    for fen in fens {
        let mut board = Board::from_str(fen).unwrap();
        let mut legal = Vec::new();
        let mut scratch = Vec::new();
        generate_legal(&mut board, &mut legal, &mut scratch);

        let reference = board.clone();
        for mv in legal {
            assert!(make_move(&mut board, mv), "{} in {}", mv, fen);
            undo_move(&mut board);
            assert_eq!(board, reference, "state drift after {} in {}", mv, fen);
        }
    }
}

#[test]
fn null_move_round_trips() {
    let mut board = Board::from_str("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
    let reference = board.clone();

    make_null_move(&mut board);
    assert_eq!(board.side_to_move, Color::Black);
    assert_eq!(board.en_passant, None);
    assert_ne!(board.zobrist, reference.zobrist);

    undo_null_move(&mut board);
    assert_eq!(board, reference);
}

#[test]
fn history_length_tracks_played_moves() {
    let mut board = Board::new();
    assert_eq!(board.history_len(), 0);
    play(&mut board, "e2e4");
    play(&mut board, "c7c5");
    assert_eq!(board.history_len(), 2);
    undo_move(&mut board);
    assert_eq!(board.history_len(), 1);
}
