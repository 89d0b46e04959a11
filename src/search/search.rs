use crate::board::{Board, Piece};
use crate::moves::execute::{make_move, make_null_move, undo_move, undo_null_move};
use crate::moves::movegen::{generate_pseudo_legal, generate_pseudo_legal_captures};
use crate::moves::square_control::in_check;
use crate::moves::types::{MAX_MOVES, MOVE_NONE, Move, MoveList};
use crate::search::context::SearchContext;
use crate::search::eval::Evaluate;
use crate::search::ordering::{KILLER_SCORE, pick_move, score_moves};
use crate::search::see::SeeExt;
use crate::search::time::SearchClock;
use crate::search::tt::TranspositionTable;
use crate::search::{MAX_DEPTH, MAX_PLY, MIN_MATE, SCORE_INF};
use crate::square::Square;
use arrayvec::ArrayVec;
use std::time::Instant;

const ASPIRATION_MIN_DEPTH: i32 = 6;
const ASPIRATION_INITIAL_DELTA: i32 = 25;

const IIR_MIN_DEPTH: i32 = 4;

const RFP_MAX_DEPTH: i32 = 8;
const RFP_DEPTH_MULTIPLIER: i32 = 75;

const NMP_MIN_DEPTH: i32 = 3;
const NMP_BASE_REDUCTION: i32 = 3;
const NMP_REDUCTION_DIVISOR: i32 = 3;

const FP_MAX_DEPTH: i32 = 7;
const FP_BASE: i32 = 120;
const FP_MULTIPLIER: i32 = 65;

const LMP_MAX_DEPTH: i32 = 8;
const LMP_MIN_MOVES_BASE: i32 = 2;

const SEE_PRUNING_MAX_DEPTH: i32 = 9;
const SEE_PRUNING_NOISY_THRESHOLD: i32 = -90;
const SEE_PRUNING_QUIET_THRESHOLD: i32 = -50;

const LMR_MIN_DEPTH: i32 = 1;
const LMR_HISTORY_DIVISOR: i32 = 1024;

/// Outcome of one `go`: the last fully completed iteration wins.
#[derive(Debug, Clone, Copy)]
pub struct SearchResult {
    pub best_move: Move,
    pub score: i32,
    pub depth: i32,
    pub nodes: u64,
}

/// One search run over borrowed state; evaluator and clock are injected.
pub struct Searcher<'a, E: Evaluate, C: SearchClock> {
    board: &'a mut Board,
    tt: &'a mut TranspositionTable,
    ctx: &'a mut SearchContext,
    evaluator: &'a E,
    clock: &'a mut C,
    nodes: u64,
    stopped: bool,
    print_info: bool,
}

impl<'a, E: Evaluate, C: SearchClock> Searcher<'a, E, C> {
    pub fn new(
        board: &'a mut Board,
        tt: &'a mut TranspositionTable,
        ctx: &'a mut SearchContext,
        evaluator: &'a E,
        clock: &'a mut C,
    ) -> Self {
        Searcher {
            board,
            tt,
            ctx,
            evaluator,
            clock,
            nodes: 0,
            stopped: false,
            print_info: false,
        }
    }

    /// Emit UCI `info` lines after each completed iteration.
    pub fn with_info(mut self) -> Self {
        self.print_info = true;
        self
    }

    /// Iterative deepening driver.
    pub fn run(&mut self, max_depth: i32) -> SearchResult {
        self.ctx.clear_for_search();
        self.tt.new_search();
        self.nodes = 0;
        self.stopped = false;

        let start = Instant::now();
        let mut best_move = MOVE_NONE;
        let mut score = 0;
        let mut completed_depth = 0;

        for depth in 1..=max_depth.clamp(1, MAX_DEPTH) {
            self.ctx.seldepth = 0;

            let iteration_score = if depth >= ASPIRATION_MIN_DEPTH {
                self.aspiration(depth, score)
            } else {
                self.search(depth, -SCORE_INF, SCORE_INF, 0, false)
            };

            if self.stopped {
                break;
            }

            score = iteration_score;
            completed_depth = depth;
            if self.ctx.pv_length(0) > 0 {
                best_move = self.ctx.root_pv()[0];
            }
            if self.print_info {
                self.report(depth, score, &start);
            }
        }

        SearchResult {
            best_move,
            score,
            depth: completed_depth,
            nodes: self.nodes,
        }
    }

    /// Narrow window around the previous score, widening on failure.
    fn aspiration(&mut self, max_depth: i32, previous_score: i32) -> i32 {
        let mut delta = ASPIRATION_INITIAL_DELTA;
        let mut alpha = (previous_score - delta).max(-SCORE_INF);
        let mut beta = (previous_score + delta).min(SCORE_INF);
        let mut depth = max_depth;

        loop {
            let score = self.search(depth, alpha, beta, 0, false);
            if self.stopped {
                return 0;
            }

            if score >= beta {
                beta = (beta + delta).min(SCORE_INF);
                depth = (depth - 1).max(1);
            } else if score <= alpha {
                beta = (alpha + beta) / 2;
                alpha = (alpha - delta).max(-SCORE_INF);
                depth = max_depth;
            } else {
                return score;
            }

            delta += delta / 2;
        }
    }

    #[inline]
    fn should_stop(&mut self) -> bool {
        if !self.stopped && self.nodes & 1023 == 0 && self.clock.time_up() {
            self.stopped = true;
        }
        self.stopped
    }

    fn search(&mut self, depth: i32, alpha: i32, beta: i32, ply: usize, skip_nmp: bool) -> i32 {
        if ply > self.ctx.seldepth {
            self.ctx.seldepth = ply;
        }
        if self.should_stop() {
            return 0;
        }

        self.ctx.clear_pv(ply);

        if ply > 0 && (self.board.is_fifty_move_draw() || self.board.is_repetition()) {
            return 0;
        }
        if ply >= MAX_PLY - 1 {
            return self.evaluator.evaluate(self.board);
        }

        let in_check_now = in_check(self.board, self.board.side_to_move);
        let mut depth = depth;
        if in_check_now {
            depth += 1; // check extension
        }

        if depth <= 0 {
            return self.qsearch(alpha, beta, ply);
        }

        let hash = self.board.zobrist;
        let probe = self.tt.probe(hash, depth, ply as i32, alpha, beta);
        if probe.cutoff {
            return probe.score;
        }

        // IIR: a node the TT has never seen is probably not worth full depth.
        if !probe.hit && depth >= IIR_MIN_DEPTH && !in_check_now {
            depth -= 1;
        }

        let pv_node = beta - alpha > 1 || ply == 0;
        let eval = self.evaluator.evaluate(self.board);

        if !pv_node && !in_check_now {
            // RFP: static eval so far above beta that a real search is moot.
            if depth <= RFP_MAX_DEPTH && eval >= beta + RFP_DEPTH_MULTIPLIER * depth {
                return eval;
            }

            // NMP: hand the opponent a free move; still >= beta means prune.
            if depth >= NMP_MIN_DEPTH
                && !skip_nmp
                && eval >= beta
                && self.board.has_non_pawn_material(self.board.side_to_move)
            {
                make_null_move(self.board);
                let reduced = depth - NMP_BASE_REDUCTION - depth / NMP_REDUCTION_DIVISOR;
                let score = -self.search(reduced, -beta, -alpha, ply + 1, true);
                undo_null_move(self.board);

                if self.stopped {
                    return 0;
                }
                if score >= MIN_MATE {
                    return beta; // never trust null-move mates
                }
                if score >= beta {
                    return score;
                }
            }
        }

        let mut moves = MoveList::new();
        generate_pseudo_legal(self.board, &mut moves);
        let mut scores = score_moves(self.board, self.ctx, &moves, probe.mv, ply);

        let stm = self.board.side_to_move;
        let original_alpha = alpha;
        let mut alpha = alpha;
        let mut best_score = -SCORE_INF;
        let mut best_move = MOVE_NONE;
        let mut legal_played: i32 = 0;
        let mut quiets_tried: ArrayVec<(Piece, Square), MAX_MOVES> = ArrayVec::new();

        for i in 0..moves.len() {
            let mv = pick_move(&mut moves, &mut scores, i);
            let move_score = scores[i];
            let history_move_or_losing = move_score < KILLER_SCORE;
            let lmr = self.ctx.lmr_reduction(depth, legal_played.max(0) as usize);
            let is_quiet = !self.board.is_capture(mv) && !mv.is_promotion();

            if !pv_node && history_move_or_losing && best_score > -MIN_MATE {
                // LMP: deep into the move list nothing good is left.
                if depth <= LMP_MAX_DEPTH
                    && legal_played >= LMP_MIN_MOVES_BASE + 2 * depth * depth
                {
                    break;
                }

                // FP: eval plus a generous margin still cannot reach alpha.
                if depth <= FP_MAX_DEPTH
                    && alpha < MIN_MATE
                    && eval + FP_BASE + (depth - lmr).max(0) * FP_MULTIPLIER <= alpha
                {
                    break;
                }

                // SEE pruning, depth-scaled and softer for quiets.
                let threshold = depth
                    * if is_quiet {
                        SEE_PRUNING_QUIET_THRESHOLD
                    } else {
                        SEE_PRUNING_NOISY_THRESHOLD
                    };
                if depth <= SEE_PRUNING_MAX_DEPTH
                    && !self.board.static_exchange_eval(mv, threshold)
                {
                    continue;
                }
            }

            if !make_move(self.board, mv) {
                continue;
            }

            legal_played += 1;
            self.nodes += 1;

            let target = mv.to();
            let history_piece = match mv.promotion() {
                Some(_) => Piece::Pawn,
                None => self.board.piece_type_at(target).unwrap_or(Piece::Pawn),
            };

            let score = if legal_played == 1 {
                -self.search(depth - 1, -beta, -alpha, ply + 1, false)
            } else {
                // LMR: late, unpromising moves get a reduced null-window look.
                let mut reduction = 0;
                if depth >= LMR_MIN_DEPTH && !in_check_now && history_move_or_losing {
                    reduction = lmr;
                    if in_check(self.board, self.board.side_to_move) {
                        reduction -= 1; // reduce checking moves less
                    }
                    if pv_node {
                        reduction -= 1;
                    }
                    if is_quiet {
                        reduction -=
                            self.ctx.history_score(stm, history_piece, target) / LMR_HISTORY_DIVISOR;
                    }
                    reduction = reduction.max(0);
                }

                let mut score =
                    -self.search(depth - 1 - reduction, -alpha - 1, -alpha, ply + 1, false);
                if score > alpha && (score < beta || reduction > 0) {
                    score = -self.search(depth - 1, -beta, -alpha, ply + 1, false);
                }
                score
            };

            undo_move(self.board);
            if self.should_stop() {
                return 0;
            }

            if is_quiet {
                quiets_tried.push((history_piece, target));
            }

            if score > best_score {
                best_score = score;
            }
            if score <= alpha {
                continue;
            }

            alpha = score;
            best_move = mv;
            if pv_node {
                self.ctx.update_pv(ply, mv);
            }

            if score < beta {
                continue;
            }

            // Beta cutoff: reward the quiet that refuted this node and
            // punish the quiets that failed before it.
            if is_quiet {
                self.ctx.update_killers(ply, mv);
                if let Some(previous) = self.board.last_move()
                    && previous != MOVE_NONE
                {
                    self.ctx.set_counter_move(stm.opposite(), previous, mv);
                }

                let bonus = depth * depth;
                self.ctx.update_history(stm, history_piece, target, bonus);
                for &(piece, to) in &quiets_tried[..quiets_tried.len() - 1] {
                    self.ctx.update_history(stm, piece, to, -bonus);
                }
            }
            break;
        }

        if legal_played == 0 {
            return if in_check_now {
                -SCORE_INF + ply as i32 // mated here
            } else {
                0 // stalemate
            };
        }

        if self.stopped {
            return 0;
        }

        self.tt
            .store(hash, depth, best_move, best_score, ply as i32, original_alpha, beta);

        best_score
    }

    /// Search only noisy moves until the position quiets down.
    fn qsearch(&mut self, alpha: i32, beta: i32, ply: usize) -> i32 {
        if self.should_stop() {
            return 0;
        }
        if ply > self.ctx.seldepth {
            self.ctx.seldepth = ply;
        }

        let eval = self.evaluator.evaluate(self.board);
        if ply >= MAX_PLY - 1 {
            return eval;
        }

        let original_alpha = alpha;
        let mut alpha = alpha;
        if eval >= beta {
            return eval;
        }
        if alpha < eval {
            alpha = eval;
        }

        let hash = self.board.zobrist;
        let probe = self.tt.probe(hash, 0, ply as i32, alpha, beta);
        if probe.cutoff {
            return probe.score;
        }

        let mut moves = MoveList::new();
        generate_pseudo_legal_captures(self.board, &mut moves);
        let mut scores = score_moves(self.board, self.ctx, &moves, probe.mv, ply);

        let mut best_score = eval;
        for i in 0..moves.len() {
            let mv = pick_move(&mut moves, &mut scores, i);

            // losing captures cannot rescue a stand-pat fail-low
            if !self.board.static_exchange_eval(mv, 0) {
                continue;
            }
            if !make_move(self.board, mv) {
                continue;
            }

            self.nodes += 1;
            let score = -self.qsearch(-beta, -alpha, ply + 1);
            undo_move(self.board);

            if self.should_stop() {
                return 0;
            }

            if score > best_score {
                best_score = score;
            } else {
                continue;
            }
            if score >= beta {
                return score;
            }
            if score > alpha {
                alpha = score;
            }
        }

        if !probe.hit || probe.depth == 0 {
            self.tt.store(
                hash,
                0,
                MOVE_NONE,
                best_score,
                ply as i32,
                original_alpha,
                beta,
            );
        }

        best_score
    }

    fn report(&self, depth: i32, score: i32, start: &Instant) {
        let elapsed_ms = start.elapsed().as_millis().max(1) as u64;
        let nps = self.nodes * 1000 / elapsed_ms;

        let score_str = if score.abs() >= MIN_MATE {
            let plies = SCORE_INF - score.abs();
            let moves = (plies + 1) / 2;
            if score > 0 {
                format!("mate {}", moves)
            } else {
                format!("mate -{}", moves)
            }
        } else {
            format!("cp {}", score)
        };

        let pv: Vec<String> = self.ctx.root_pv().iter().map(|m| m.to_uci()).collect();
        println!(
            "info depth {} seldepth {} score {} nodes {} nps {} time {} pv {}",
            depth,
            self.ctx.seldepth,
            score_str,
            self.nodes,
            nps,
            elapsed_ms,
            pv.join(" ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::eval::MaterialEvaluator;
    use crate::search::time::TimeManager;
    use std::str::FromStr;

    fn search_parts() -> (TranspositionTable, SearchContext, TimeManager) {
        (
            TranspositionTable::new(8),
            SearchContext::new(),
            TimeManager::infinite(),
        )
    }

    #[test]
    fn repeated_node_scores_zero_away_from_root() {
        let mut board = Board::new();
        for uci in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            let mv = Move::from_uci(&board, uci).unwrap();
            assert!(make_move(&mut board, mv));
        }
        // the start position has now occurred before
        assert!(board.is_repetition());

        let (mut tt, mut ctx, mut clock) = search_parts();
        let evaluator = MaterialEvaluator;
        let mut searcher = Searcher::new(&mut board, &mut tt, &mut ctx, &evaluator, &mut clock);
        let score = searcher.search(4, -SCORE_INF, SCORE_INF, 1, false);
        assert_eq!(score, 0);
    }

    #[test]
    fn fifty_move_rule_scores_zero_away_from_root() {
        let mut board =
            Board::from_str("4k3/8/8/8/8/8/8/R3K3 w - - 100 80").unwrap();
        let (mut tt, mut ctx, mut clock) = search_parts();
        let evaluator = MaterialEvaluator;
        let mut searcher = Searcher::new(&mut board, &mut tt, &mut ctx, &evaluator, &mut clock);
        let score = searcher.search(4, -SCORE_INF, SCORE_INF, 1, false);
        assert_eq!(score, 0);
    }

    #[test]
    fn mated_side_gets_a_mate_score() {
        // white is checkmated (fool's mate)
        let mut board =
            Board::from_str("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        let (mut tt, mut ctx, mut clock) = search_parts();
        let evaluator = MaterialEvaluator;
        let mut searcher = Searcher::new(&mut board, &mut tt, &mut ctx, &evaluator, &mut clock);
        let score = searcher.search(2, -SCORE_INF, SCORE_INF, 0, false);
        assert_eq!(score, -SCORE_INF);
    }
}
