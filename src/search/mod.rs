//! Search module for Gomoku AI
//!
//! Contains:
//! - Zobrist hashing for position identification
//! - Transposition table for caching search results
//! - Killer and history tables for move ordering
//! - Alpha-Beta search with iterative deepening

pub mod alphabeta;
pub mod heuristics;
pub mod tt;
pub mod zobrist;

pub use alphabeta::{
    RootMove, SearchOptions, SearchResult, SearchSession, SearchStats, Searcher, FORCED_WIN_SCORE, INF,
    WIN_SCORE,
};
pub use heuristics::{HistoryTable, KillerTable};
pub use tt::{EntryType, TTEntry, TTKey, TTStats, TTWindow, TranspositionTable};
pub use zobrist::{Hasher, ZobristTable};
