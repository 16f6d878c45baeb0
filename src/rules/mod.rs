//! Game rules for free-style Gomoku
//!
//! Five or more in a row wins. Black moves first; there are no captures
//! and no forbidden moves.

pub mod win;

// Re-exports for convenient access
pub use win::{check_winner, find_five_positions, has_five_at_pos, has_five_in_row, GameResult};
