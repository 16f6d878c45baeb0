//! Error types for the engine
//!
//! Board errors are recoverable: a rejected move leaves the board, hash and
//! evaluator caches exactly as they were. Configuration errors surface when
//! an engine is built, never in the middle of a search.

use thiserror::Error;

use crate::board::{Pos, Stone};

/// Errors raised by [`Board`](crate::board::Board) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Target cell lies outside the board
    #[error("position ({row}, {col}) is outside a {size}x{size} board")]
    OutOfBounds { row: i32, col: i32, size: usize },

    /// Target cell already holds a stone
    #[error("position ({}, {}) is already occupied", pos.row, pos.col)]
    Occupied { pos: Pos },

    /// Tried to place `Stone::Empty`
    #[error("cannot place an empty stone")]
    EmptyStone,

    /// Undo requested with no moves recorded
    #[error("no move to undo")]
    NoHistory,

    /// Board size outside the supported range
    #[error("board size {size} is not supported (must be {min}..={max})")]
    InvalidSize { size: usize, min: usize, max: usize },

    /// Snapshot rows do not form a square grid
    #[error("snapshot row {row} has {len} cells, expected {expected}")]
    RaggedSnapshot { row: usize, len: usize, expected: usize },
}

/// Errors raised while validating an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Difficulty level outside 1..=5
    #[error("unknown difficulty level {0} (expected 1..=5)")]
    UnknownLevel(u8),

    /// Candidate cap of zero would leave the search without moves
    #[error("candidate cap must be at least 1, got {0}")]
    InvalidCandidateCap(usize),

    /// Randomization probability outside [0, 1]
    #[error("random chance must be within [0, 1], got {0}")]
    InvalidRandomChance(f64),

    /// Depth ceiling of zero
    #[error("search depth must be at least 1, got {0}")]
    InvalidDepth(u8),

    /// Quiescence depth beyond the supported ceiling
    #[error("quiescence depth {depth} exceeds the maximum of {max}")]
    InvalidQuiescenceDepth { depth: u8, max: u8 },

    /// Configuration text could not be parsed
    #[error("invalid configuration: {0}")]
    Parse(String),
}

/// Errors raised by [`AIEngine`](crate::engine::AIEngine).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The side to move must be a real player
    #[error("side to move must be Black or White, got {0:?}")]
    InvalidSide(Stone),
}

/// Result alias for board operations
pub type BoardResult<T> = Result<T, BoardError>;
