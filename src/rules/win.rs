//! Win condition checking
//!
//! Five or more stones in a row along any of the four axes wins; overlines
//! count. There are no capture or forbidden-move rules.

use crate::board::{Board, Pos, Stone, DIRECTIONS, WIN_LENGTH};

/// Length of the run through `pos` along `(dr, dc)`, counting `pos` itself.
fn run_length(board: &Board, pos: Pos, color: Stone, dr: i32, dc: i32) -> usize {
    let size = board.size();
    let mut count = 1;
    for sign in [1, -1] {
        let mut k = 1;
        while let Some(next) = pos.offset(dr * sign, dc * sign, k, size) {
            if board.get(next) != color {
                break;
            }
            count += 1;
            k += 1;
        }
    }
    count
}

/// Fast five-in-a-row check at a specific position.
///
/// Only checks 4 directions from the given position. No allocation.
/// `pos` itself is counted as `color` whether or not it is occupied yet.
#[inline]
pub fn has_five_at_pos(board: &Board, pos: Pos, color: Stone) -> bool {
    DIRECTIONS
        .iter()
        .any(|&(dr, dc)| run_length(board, pos, color, dr, dc) >= WIN_LENGTH)
}

/// Find the positions of a 5-in-a-row if one exists
///
/// Returns the full run (overlines included) starting from its lowest cell.
pub fn find_five_positions(board: &Board, stone: Stone) -> Option<Vec<Pos>> {
    if !stone.is_player() {
        return None;
    }
    let size = board.size();

    for idx in 0..size * size {
        let pos = Pos::from_index(idx, size);
        if board.get(pos) != stone {
            continue;
        }
        for &(dr, dc) in &DIRECTIONS {
            // Only start from the first stone of a run
            if pos
                .offset(-dr, -dc, 1, size)
                .is_some_and(|prev| board.get(prev) == stone)
            {
                continue;
            }
            let line: Vec<Pos> = (0..)
                .map_while(|k| pos.offset(dr, dc, k, size))
                .take_while(|&p| board.get(p) == stone)
                .collect();
            if line.len() >= WIN_LENGTH {
                return Some(line);
            }
        }
    }
    None
}

/// Check if there's 5+ in a row for the given color
pub fn has_five_in_row(board: &Board, stone: Stone) -> bool {
    find_five_positions(board, stone).is_some()
}

/// Outcome of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Win(Stone),
    Draw,
}

/// Check for a winner
///
/// Returns `Some(GameResult::Win(_))` if either color has five, `Draw` when
/// the board is full without one, and `None` while the game goes on.
pub fn check_winner(board: &Board) -> Option<GameResult> {
    // The last move is the only one that can have completed a line
    if let Some(last) = board.last_move() {
        if has_five_at_pos(board, last.pos, last.stone) {
            return Some(GameResult::Win(last.stone));
        }
    } else {
        for stone in [Stone::Black, Stone::White] {
            if has_five_in_row(board, stone) {
                return Some(GameResult::Win(stone));
            }
        }
    }

    if board.is_full() {
        Some(GameResult::Draw)
    } else {
        None
    }
}
