//! Gomoku AI Engine
//!
//! A connect-five engine for square boards from 5x5 to 25x25:
//! - Five or more in a row wins (overlines allowed)
//! - No captures, no forbidden moves
//! - Computer opponent with five difficulty levels
//!
//! # Architecture
//!
//! The engine is organized into several modules:
//! - [`board`]: Board with move/undo, Zobrist hash and pattern caches
//! - [`eval`]: Shape classification, incremental evaluator and move generation
//! - [`search`]: Alpha-beta with PVS, transposition table, killers and history
//! - [`book`]: Opening book keyed by position hash
//! - [`difficulty`]: Level to depth/time/randomization mapping
//! - [`rules`]: Five-in-a-row detection
//! - [`engine`]: Main AI engine integrating all components
//!
//! # Quick Start
//!
//! ```
//! use gomoku_ai::{AIEngine, Board, EngineConfig, Pos, Stone};
//!
//! let config = EngineConfig { level: 1, seed: Some(1), ..EngineConfig::default() };
//! let mut engine = AIEngine::new(config).unwrap();
//! let mut board = Board::new(15).unwrap();
//!
//! board.play(Pos::new(7, 7)).unwrap();
//!
//! // AI responds as White
//! if let Some(pos) = engine.get_move(&board, Stone::White).unwrap() {
//!     board.play(pos).unwrap();
//!     println!("AI plays at {pos}");
//! }
//! ```

pub mod board;
pub mod book;
pub mod config;
pub mod difficulty;
pub mod engine;
pub mod error;
pub mod eval;
pub mod rules;
pub mod search;

// Re-export commonly used types for convenience
pub use board::{Board, Pos, Stone, DEFAULT_SIZE};
pub use config::EngineConfig;
pub use difficulty::{Difficulty, DifficultySettings};
pub use engine::{AIEngine, MoveResult, MoveSource};
pub use error::{BoardError, ConfigError, EngineError};
