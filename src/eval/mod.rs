//! Evaluation module for Gomoku positions
//!
//! This module provides pattern recognition and scoring for board positions.
//! The evaluation considers:
//! - Line shapes (twos, threes, fours, fives) per direction
//! - Composite threats at a single cell (four-three, four-four, three-three)
//! - Candidate move tiers derived from the same caches

pub mod evaluator;
pub mod moves;
pub mod patterns;

pub use evaluator::Evaluator;
pub use moves::{MoveFilter, DEFAULT_CANDIDATE_CAP};
pub use patterns::{PatternScore, Shape};
