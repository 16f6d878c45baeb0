//! Board representation for Gomoku

pub mod board;


// Re-exports
pub use board::{Board, MoveRecord};

/// Default board size (15x15)
pub const DEFAULT_SIZE: usize = 15;
/// Smallest supported board (one winning line must fit)
pub const MIN_SIZE: usize = WIN_LENGTH;
/// Largest supported board; keeps `Pos` coordinates in a `u8`
pub const MAX_SIZE: usize = 25;
/// Stones in a row needed to win (overlines also win)
pub const WIN_LENGTH: usize = 5;

/// The four line axes: horizontal, vertical, diagonal, anti-diagonal
pub const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Stone colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Stone {
    Empty,
    Black,
    White,
}

impl Stone {
    /// Get opponent color
    #[inline]
    pub fn opponent(self) -> Stone {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
            Stone::Empty => Stone::Empty,
        }
    }

    /// Index into per-player tables (Black = 0, White = 1).
    ///
    /// Returns `None` for `Empty`.
    #[inline]
    pub fn player_index(self) -> Option<usize> {
        match self {
            Stone::Black => Some(0),
            Stone::White => Some(1),
            Stone::Empty => None,
        }
    }

    #[inline]
    pub fn is_player(self) -> bool {
        self != Stone::Empty
    }
}

/// Position on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    #[inline]
    pub fn new(row: u8, col: u8) -> Self {
        debug_assert!((row as usize) < MAX_SIZE && (col as usize) < MAX_SIZE);
        Self { row, col }
    }

    /// Row-major index on a board of the given size
    #[inline]
    pub fn to_index(self, size: usize) -> usize {
        self.row as usize * size + self.col as usize
    }

    #[inline]
    pub fn from_index(idx: usize, size: usize) -> Self {
        Self {
            row: (idx / size) as u8,
            col: (idx % size) as u8,
        }
    }

    /// Centre cell of a board of the given size
    #[inline]
    pub fn center(size: usize) -> Self {
        let c = (size / 2) as u8;
        Self { row: c, col: c }
    }

    #[inline]
    pub fn is_valid(row: i32, col: i32, size: usize) -> bool {
        row >= 0 && row < size as i32 && col >= 0 && col < size as i32
    }

    /// Step `k` cells along `(dr, dc)`, or `None` when that leaves the board.
    #[inline]
    pub fn offset(self, dr: i32, dc: i32, k: i32, size: usize) -> Option<Pos> {
        let r = i32::from(self.row) + dr * k;
        let c = i32::from(self.col) + dc * k;
        if Pos::is_valid(r, c, size) {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Some(Pos::new(r as u8, c as u8))
        } else {
            None
        }
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pos {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.row, self.col).cmp(&(other.row, other.col))
    }
}
