use crate::board::Board;
use crate::moves::execute::{generate_legal, make_move, undo_move};
use crate::moves::types::Move;
use tracing::{debug, instrument};

const MAX_PERFT_DEPTH: usize = 16;

fn make_buffers() -> [Vec<Move>; MAX_PERFT_DEPTH] {
    std::array::from_fn(|_| Vec::with_capacity(64))
}

fn make_scratch() -> [Vec<Move>; MAX_PERFT_DEPTH] {
    std::array::from_fn(|_| Vec::with_capacity(256))
}

fn perft_recursive(
    board: &mut Board,
    depth: u32,
    ply: usize,
    buffers: &mut [Vec<Move>],
    scratch: &mut [Vec<Move>],
) -> u64 {
    if depth == 0 {
        return 1;
    }

    {
        let moves = &mut buffers[ply];
        let pseudo = &mut scratch[ply];
        moves.clear();
        generate_legal(board, moves, pseudo);
    }

    if depth == 1 {
        return buffers[ply].len() as u64;
    }

    let move_count = buffers[ply].len();
    let mut nodes = 0;

    for i in 0..move_count {
        let mv = buffers[ply][i];

        #[cfg(debug_assertions)]
        let hash_before = board.zobrist;

        let made = make_move(board, mv);
        debug_assert!(made, "legal move rejected by make_move: {}", mv);
        nodes += perft_recursive(board, depth - 1, ply + 1, buffers, scratch);
        undo_move(board);

        #[cfg(debug_assertions)]
        {
            debug_assert_eq!(board.zobrist, hash_before, "hash changed across make/undo");
            debug_assert_eq!(board.compute_zobrist_full(), board.zobrist);
        }
    }

    nodes
}

/// Count leaf nodes of the legal move tree to `depth`.
#[instrument(skip(board), fields(depth))]
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    assert!(
        (depth as usize) < MAX_PERFT_DEPTH,
        "perft depth {} out of range",
        depth
    );

    let mut buffers = make_buffers();
    let mut scratch = make_scratch();
    perft_recursive(board, depth, 0, &mut buffers, &mut scratch)
}

/// Perft with per-root-move subtotals, printed in UCI "divide" style.
#[instrument(skip(board), fields(depth))]
pub fn perft_divide(board: &mut Board, depth: u32) -> u64 {
    assert!(
        depth >= 1 && (depth as usize) < MAX_PERFT_DEPTH,
        "perft depth {} out of range",
        depth
    );

    let mut buffers = make_buffers();
    let mut scratch = make_scratch();

    {
        let moves = &mut buffers[0];
        let pseudo = &mut scratch[0];
        moves.clear();
        generate_legal(board, moves, pseudo);
    }

    let move_count = buffers[0].len();
    let mut total = 0;

    for i in 0..move_count {
        let mv = buffers[0][i];
        let _ = make_move(board, mv);
        let nodes = if depth == 1 {
            1
        } else {
            perft_recursive(board, depth - 1, 1, &mut buffers, &mut scratch)
        };
        undo_move(board);

        debug!(%mv, nodes, "divide subtotal");
        println!("{}: {}", mv, nodes);
        total += nodes;
    }

    println!("Total: {}", total);
    total
}
