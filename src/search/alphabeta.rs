//! Alpha-Beta search with iterative deepening and transposition table
//!
//! This module implements the core search algorithm for the Gomoku AI.
//! It uses negamax with alpha-beta pruning, principal variation search and
//! a forcing-move quiescence extension.
//!
//! # Features
//!
//! - Iterative deepening with a cooperative time budget checked at the root
//! - Exact score for every root move, so callers get a full ranking
//! - Transposition table keyed on (hash, side to move)
//! - Killer and history move ordering kept in a [`SearchSession`]
//!
//! # Example
//!
//! ```
//! use gomoku_ai::board::{Board, Pos, Stone};
//! use gomoku_ai::search::{SearchOptions, Searcher};
//!
//! let mut searcher = Searcher::new(15, SearchOptions::default());
//! let mut board = Board::new(15).unwrap();
//! board.put(Pos::new(7, 7), Stone::Black).unwrap();
//!
//! let result = searcher.search(&board, Stone::White, 2, None);
//! if let Some(best_move) = result.best_move {
//!     println!("Best move: ({}, {})", best_move.row, best_move.col);
//! }
//! ```

use std::cmp::Reverse;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::board::{Board, Pos, Stone};
use crate::eval::{MoveFilter, PatternScore, DEFAULT_CANDIDATE_CAP};

use super::heuristics::{HistoryTable, KillerTable};
use super::tt::{EntryType, TTEntry, TTKey, TTStats, TTWindow, TranspositionTable};

/// Score of a completed five, before the ply adjustment
pub const WIN_SCORE: i32 = PatternScore::FIVE * 10;

/// Infinity score for alpha-beta bounds
pub const INF: i32 = WIN_SCORE + 1_000;

/// Scores at or beyond this magnitude are wins or losses
const WIN_THRESHOLD: i32 = WIN_SCORE - 1_000;

/// A root score at or above this ends iterative deepening. Static
/// evaluations are clamped below it, so only a found five can reach it.
pub const FORCED_WIN_SCORE: i32 = PatternScore::FIVE / 2;

/// Deepest quiescence extension a configuration may ask for
pub const MAX_QUIESCENCE_DEPTH: u8 = 16;

/// Quiescence plies searched past the nominal depth by default
pub const DEFAULT_QUIESCENCE_DEPTH: u8 = 4;

/// Search statistics for diagnostics and tuning.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Nodes visited, quiescence included
    pub nodes: u64,
    /// Nodes visited inside quiescence
    pub qnodes: u64,
    /// Total beta cutoffs (fail-high)
    pub beta_cutoffs: u64,
    /// Beta cutoffs on the first move tried (measures move ordering quality)
    pub first_move_cutoffs: u64,
    /// Total TT probes
    pub tt_probes: u64,
    /// TT probes that returned a usable score (exact/bound hit)
    pub tt_score_hits: u64,
    /// TT probes that provided a best move for ordering
    pub tt_move_hits: u64,
}

impl SearchStats {
    /// First-move cutoff rate (target: ~90% for good move ordering)
    pub fn first_move_rate(&self) -> f64 {
        if self.beta_cutoffs == 0 {
            0.0
        } else {
            self.first_move_cutoffs as f64 / self.beta_cutoffs as f64 * 100.0
        }
    }

    /// TT score hit rate
    pub fn tt_score_rate(&self) -> f64 {
        if self.tt_probes == 0 {
            0.0
        } else {
            self.tt_score_hits as f64 / self.tt_probes as f64 * 100.0
        }
    }
}

/// A root move with the exact score of the last completed depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootMove {
    pub pos: Pos,
    pub score: i32,
}

/// Search result containing the best move found and associated statistics.
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    /// Best move found, if any
    pub best_move: Option<Pos>,
    /// Evaluation score of the best move
    pub score: i32,
    /// Depth completed in iterative deepening
    pub depth: i32,
    /// Total nodes searched
    pub nodes: u64,
    /// Root moves, best first
    pub ranked: Vec<RootMove>,
    /// Search diagnostics
    pub stats: SearchStats,
    pub elapsed: Duration,
}

/// Knobs that shape a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Candidates considered per node
    pub candidate_cap: usize,
    pub use_tt: bool,
    /// Extra forcing plies searched at the horizon
    pub quiescence_depth: u8,
    /// Flush the table when it would grow past this many entries
    pub tt_capacity: Option<usize>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            candidate_cap: DEFAULT_CANDIDATE_CAP,
            use_tt: true,
            quiescence_depth: DEFAULT_QUIESCENCE_DEPTH,
            tt_capacity: None,
        }
    }
}

/// Tables that outlive a single search: they are reset only for a new game.
#[derive(Debug)]
pub struct SearchSession {
    tt: TranspositionTable,
    killers: KillerTable,
    history: HistoryTable,
}

impl SearchSession {
    #[must_use]
    pub fn new(size: usize, tt_capacity: Option<usize>) -> Self {
        Self {
            tt: TranspositionTable::with_capacity(tt_capacity),
            killers: KillerTable::new(),
            history: HistoryTable::new(size),
        }
    }

    #[inline]
    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    #[inline]
    pub fn killers(&self) -> &KillerTable {
        &self.killers
    }

    #[inline]
    pub fn history(&self) -> &HistoryTable {
        &self.history
    }

    /// Forget everything learned in previous searches.
    pub fn clear(&mut self) {
        self.tt.clear();
        self.killers.clear();
        self.history.clear();
    }
}

/// Convert a score at `ply` into the node-relative form stored in the table.
#[inline]
fn score_to_tt(score: i32, ply: i32) -> i32 {
    if score >= WIN_THRESHOLD {
        score + ply
    } else if score <= -WIN_THRESHOLD {
        score - ply
    } else {
        score
    }
}

#[inline]
fn score_from_tt(score: i32, ply: i32) -> i32 {
    if score >= WIN_THRESHOLD {
        score - ply
    } else if score <= -WIN_THRESHOLD {
        score + ply
    } else {
        score
    }
}

/// Alpha-beta searcher over a persistent [`SearchSession`].
#[derive(Debug)]
pub struct Searcher {
    options: SearchOptions,
    session: SearchSession,
    stats: SearchStats,
}

impl Searcher {
    #[must_use]
    pub fn new(size: usize, options: SearchOptions) -> Self {
        Self {
            options,
            session: SearchSession::new(size, options.tt_capacity),
            stats: SearchStats::default(),
        }
    }

    #[inline]
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: SearchOptions) {
        if options.tt_capacity != self.options.tt_capacity {
            self.session.tt = TranspositionTable::with_capacity(options.tt_capacity);
        }
        self.options = options;
    }

    #[inline]
    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    /// Reset transposition, killer and history tables.
    pub fn new_game(&mut self) {
        self.session.clear();
    }

    #[must_use]
    pub fn tt_stats(&self) -> TTStats {
        self.session.tt.stats()
    }

    /// Iterative deepening search from an unmodified root.
    ///
    /// Every candidate at the root is searched with a full window on its own
    /// copy of the board, so `ranked` holds exact scores. Time is checked only
    /// at the root, after depth 1 has completed; a depth cut short by the
    /// budget is thrown away.
    pub fn search(
        &mut self,
        board: &Board,
        side: Stone,
        max_depth: i32,
        time_budget: Option<Duration>,
    ) -> SearchResult {
        let start = Instant::now();
        self.stats = SearchStats::default();
        if self.session.history.size() != board.size() {
            self.session.history = HistoryTable::new(board.size());
        }

        let mut result = SearchResult::default();
        if !side.is_player() || board.is_full() {
            return result;
        }

        let out_of_time =
            |depth: i32| depth > 1 && time_budget.is_some_and(|budget| start.elapsed() >= budget);

        for depth in 1..=max_depth.max(1) {
            if out_of_time(depth) {
                break;
            }

            let mut moves = board.candidates(side, depth, MoveFilter::ALL, self.options.candidate_cap);
            // Previous ranking first, new candidates after in generator order
            let previous: Vec<Pos> = result.ranked.iter().map(|m| m.pos).collect();
            moves.sort_by_key(|mv| previous.iter().position(|p| p == mv).unwrap_or(usize::MAX));

            let mut ranked = Vec::with_capacity(moves.len());
            let mut completed = true;
            for mv in moves {
                if out_of_time(depth) {
                    completed = false;
                    break;
                }
                let mut child = board.deep_copy();
                if child.put(mv, side).is_err() {
                    continue;
                }
                let score = -self.negamax_at(&mut child, depth - 1, -INF, INF, side.opponent(), 1);
                ranked.push(RootMove { pos: mv, score });
            }

            if !completed || ranked.is_empty() {
                break;
            }

            ranked.sort_by_key(|m| Reverse(m.score));
            result.best_move = Some(ranked[0].pos);
            result.score = ranked[0].score;
            result.depth = depth;
            result.ranked = ranked;

            debug!(
                depth,
                score = result.score,
                best = ?result.best_move,
                nodes = self.stats.nodes,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "depth complete"
            );

            if result.score >= FORCED_WIN_SCORE || result.ranked.len() == 1 {
                break;
            }
        }

        result.nodes = self.stats.nodes;
        result.stats = self.stats.clone();
        result.elapsed = start.elapsed();
        result
    }

    /// Negamax value of `board` for `side` to move, searched to `depth`.
    pub fn negamax(&mut self, board: &mut Board, depth: i32, alpha: i32, beta: i32, side: Stone) -> i32 {
        self.negamax_at(board, depth, alpha, beta, side, 0)
    }

    /// Score if the game is already decided, from `side`'s point of view.
    #[inline]
    fn terminal_score(board: &Board, side: Stone, ply: i32) -> Option<i32> {
        if let Some(last) = board.last_move() {
            if last.stone == side.opponent() && board.is_winning_move(last.pos, last.stone) {
                return Some(-(WIN_SCORE - ply));
            }
        }
        if board.is_full() {
            return Some(0);
        }
        None
    }

    fn negamax_at(
        &mut self,
        board: &mut Board,
        depth: i32,
        mut alpha: i32,
        mut beta: i32,
        side: Stone,
        ply: i32,
    ) -> i32 {
        self.stats.nodes += 1;

        if let Some(score) = Self::terminal_score(board, side, ply) {
            return score;
        }

        let key = TTKey::new(board.hash(), side);
        let mut tt_move = None;
        if self.options.use_tt {
            self.stats.tt_probes += 1;
            if let Some(entry) = self.session.tt.probe(key) {
                tt_move = entry.best_move;
                if tt_move.is_some() {
                    self.stats.tt_move_hits += 1;
                }
                let stored = score_from_tt(entry.score, ply);
                let adjusted = TTEntry { score: stored, ..*entry };
                match adjusted.narrow(depth, alpha, beta) {
                    TTWindow::Cutoff(score) => {
                        self.stats.tt_score_hits += 1;
                        return score;
                    }
                    TTWindow::Search { alpha: a, beta: b } => {
                        alpha = a;
                        beta = b;
                    }
                }
            }
        }

        if depth <= 0 {
            return self.quiescence(board, alpha, beta, side, self.options.quiescence_depth, ply);
        }

        let mut moves = board.candidates(side, depth, MoveFilter::ALL, self.options.candidate_cap);
        if moves.is_empty() {
            return 0;
        }
        self.order_moves(&mut moves, side, depth, tt_move);

        // Lower bound of the window actually searched, after any narrowing
        let alpha_orig = alpha;
        let opponent = side.opponent();
        let mut best_score = -INF;
        let mut best_move = None;

        for (i, &mv) in moves.iter().enumerate() {
            if board.put(mv, side).is_err() {
                continue;
            }

            // PVS: full window for the first move, null window for the rest
            let score = if i == 0 {
                -self.negamax_at(board, depth - 1, -beta, -alpha, opponent, ply + 1)
            } else {
                let mut s = -self.negamax_at(board, depth - 1, -alpha - 1, -alpha, opponent, ply + 1);
                if s > alpha && s < beta {
                    s = -self.negamax_at(board, depth - 1, -beta, -alpha, opponent, ply + 1);
                }
                s
            };

            let undone = board.undo();
            debug_assert!(undone.is_ok(), "undo after a successful put");

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                self.stats.beta_cutoffs += 1;
                if i == 0 {
                    self.stats.first_move_cutoffs += 1;
                }
                self.session.killers.record(depth, mv);
                self.session.history.reward(side, mv, depth);
                break;
            }
        }

        if self.options.use_tt && key.hash != 0 {
            let entry_type = if best_score <= alpha_orig {
                EntryType::UpperBound
            } else if best_score >= beta {
                EntryType::LowerBound
            } else {
                EntryType::Exact
            };
            self.session
                .tt
                .store(key, depth, score_to_tt(best_score, ply), entry_type, best_move);
        }

        best_score
    }

    /// TT move, then killers for this depth, then history. The sort is
    /// stable, so generator order decides the remaining ties.
    fn order_moves(&self, moves: &mut [Pos], side: Stone, depth: i32, tt_move: Option<Pos>) {
        let killers = self.session.killers.get(depth);
        let history = &self.session.history;
        moves.sort_by_cached_key(|&mv| {
            let rank = if Some(mv) == tt_move {
                0
            } else if killers[0] == Some(mv) {
                1
            } else if killers[1] == Some(mv) {
                2
            } else {
                3
            };
            (rank, Reverse(history.score(side, mv)))
        });
    }

    /// Forcing-move extension at the horizon (fail-hard).
    fn quiescence(
        &mut self,
        board: &mut Board,
        mut alpha: i32,
        beta: i32,
        side: Stone,
        qdepth: u8,
        ply: i32,
    ) -> i32 {
        self.stats.nodes += 1;
        self.stats.qnodes += 1;

        if let Some(score) = Self::terminal_score(board, side, ply) {
            return score;
        }

        // Stand-pat: static evaluation as lower bound. Not available while the
        // opponent threatens five, unless the horizon is reached.
        let threatened = board.evaluator().five_points(side.opponent()) > 0;
        if !threatened || qdepth == 0 {
            let stand_pat = board.evaluate(side);
            if stand_pat >= beta {
                return beta;
            }
            if stand_pat > alpha {
                alpha = stand_pat;
            }
            if qdepth == 0 {
                return alpha;
            }
        }

        let moves = board.candidates(side, 0, MoveFilter::FORCING, self.options.candidate_cap);
        let opponent = side.opponent();
        for mv in moves {
            if board.put(mv, side).is_err() {
                continue;
            }
            let score = -self.quiescence(board, -beta, -alpha, opponent, qdepth - 1, ply + 1);
            let undone = board.undo();
            debug_assert!(undone.is_ok(), "undo after a successful put");

            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }
        alpha
    }
}

#[cfg(test)]
impl Searcher {
    /// Full-width minimax over the same candidates, no pruning or tables.
    fn reference_negamax(&self, board: &mut Board, depth: i32, side: Stone, ply: i32) -> i32 {
        if let Some(score) = Self::terminal_score(board, side, ply) {
            return score;
        }
        if depth <= 0 {
            return self.reference_quiescence(board, side, self.options.quiescence_depth, ply);
        }
        let moves = board.candidates(side, depth, MoveFilter::ALL, self.options.candidate_cap);
        if moves.is_empty() {
            return 0;
        }
        let mut best = -INF;
        for mv in moves {
            board.put(mv, side).unwrap();
            let score = -self.reference_negamax(board, depth - 1, side.opponent(), ply + 1);
            board.undo().unwrap();
            best = best.max(score);
        }
        best
    }

    fn reference_quiescence(&self, board: &mut Board, side: Stone, qdepth: u8, ply: i32) -> i32 {
        if let Some(score) = Self::terminal_score(board, side, ply) {
            return score;
        }
        if qdepth == 0 {
            return board.evaluate(side);
        }
        let mut best = if board.evaluator().five_points(side.opponent()) > 0 {
            -INF
        } else {
            board.evaluate(side)
        };
        for mv in board.candidates(side, 0, MoveFilter::FORCING, self.options.candidate_cap) {
            board.put(mv, side).unwrap();
            let score = -self.reference_quiescence(board, side.opponent(), qdepth - 1, ply + 1);
            board.undo().unwrap();
            best = best.max(score);
        }
        best
    }
}
