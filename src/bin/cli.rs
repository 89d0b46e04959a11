use lumen::board::Board;
use lumen::moves::execute::make_move;
use lumen::moves::perft::perft_divide;
use lumen::moves::types::Move;
use lumen::search::context::SearchContext;
use lumen::search::eval::MaterialEvaluator;
use lumen::search::search::Searcher;
use lumen::search::time::{GoLimits, TimeManager, allocate_time};
use lumen::search::tt::{DEFAULT_TT_MB, TranspositionTable};
use lumen::search::MAX_DEPTH;
use std::io::{self, BufRead};
use std::str::FromStr;

fn main() {
    #[cfg(feature = "cli")]
    if let Some(path) = std::env::var_os("LUMEN_LOG") {
        lumen::logger::init_logging(path, "info");
    }

    let mut board = Board::new();
    let mut tt = TranspositionTable::new(DEFAULT_TT_MB);
    let mut ctx = SearchContext::new();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = parts.first() else {
            continue;
        };

        match command {
            "uci" => {
                println!("id name Lumen {}", env!("CARGO_PKG_VERSION"));
                println!("id author the Lumen authors");
                println!(
                    "option name Hash type spin default {} min 1 max 4096",
                    DEFAULT_TT_MB
                );
                println!("uciok");
            }
            "isready" => println!("readyok"),
            "ucinewgame" => {
                board = Board::new();
                tt.clear();
                ctx = SearchContext::new();
            }
            "setoption" => handle_setoption(&parts, &mut tt),
            "position" => {
                if let Some(new_board) = handle_position(&parts) {
                    board = new_board;
                }
            }
            "go" => handle_go(&parts, &mut board, &mut tt, &mut ctx),
            "perft" => {
                if let Some(depth) = parts.get(1).and_then(|s| s.parse().ok()) {
                    perft_divide(&mut board, depth);
                }
            }
            "d" | "display" => println!("{}", board),
            "quit" => break,
            _ => {}
        }
    }
}

fn handle_setoption(parts: &[&str], tt: &mut TranspositionTable) {
    // setoption name <id> value <x>
    let name_idx = parts.iter().position(|&p| p == "name");
    let value_idx = parts.iter().position(|&p| p == "value");
    if let (Some(n), Some(v)) = (name_idx, value_idx)
        && parts.get(n + 1).map(|s| s.eq_ignore_ascii_case("hash")) == Some(true)
        && let Some(mb) = parts.get(v + 1).and_then(|s| s.parse::<usize>().ok())
    {
        tt.resize(mb.clamp(1, 4096));
    }
}

fn handle_position(parts: &[&str]) -> Option<Board> {
    let mut board = match parts.get(1) {
        Some(&"startpos") => Board::new(),
        Some(&"fen") => {
            let fen_end = parts
                .iter()
                .position(|&p| p == "moves")
                .unwrap_or(parts.len());
            let fen = parts.get(2..fen_end)?.join(" ");
            match Board::from_str(&fen) {
                Ok(board) => board,
                Err(err) => {
                    eprintln!("invalid fen: {}", err);
                    return None;
                }
            }
        }
        _ => return None,
    };

    if let Some(moves_idx) = parts.iter().position(|&p| p == "moves") {
        for &uci in &parts[moves_idx + 1..] {
            let Some(mv) = Move::from_uci(&board, uci) else {
                eprintln!("invalid move: {}", uci);
                return None;
            };
            if !make_move(&mut board, mv) {
                eprintln!("illegal move: {}", uci);
                return None;
            }
        }
    }

    Some(board)
}

fn handle_go(
    parts: &[&str],
    board: &mut Board,
    tt: &mut TranspositionTable,
    ctx: &mut SearchContext,
) {
    let mut limits = GoLimits::default();
    let mut iter = parts.iter().skip(1);
    while let Some(&token) = iter.next() {
        let value = iter.clone().next().and_then(|s| s.parse::<u64>().ok());
        match token {
            "depth" => limits.depth = value.map(|v| v as i32),
            "movetime" => limits.movetime = value,
            "wtime" => limits.wtime = value,
            "btime" => limits.btime = value,
            "winc" => limits.winc = value,
            "binc" => limits.binc = value,
            "movestogo" => limits.movestogo = value,
            _ => {}
        }
    }

    let allotted = allocate_time(&limits, board.side_to_move);
    let mut clock = TimeManager::new(allotted);
    let max_depth = limits.depth.unwrap_or(MAX_DEPTH);

    let evaluator = MaterialEvaluator;
    let result = Searcher::new(board, tt, ctx, &evaluator, &mut clock)
        .with_info()
        .run(max_depth);

    if result.best_move.is_none() {
        println!("bestmove 0000");
    } else {
        println!("bestmove {}", result.best_move.to_uci());
    }
}
