//! Board structure with incremental hash and evaluator

use std::fmt;

use super::{Pos, Stone, MAX_SIZE, MIN_SIZE};
use crate::error::{BoardError, BoardResult};
use crate::eval::{Evaluator, MoveFilter};
use crate::rules::win::has_five_at_pos;
use crate::search::Hasher;

/// Game board with move history.
///
/// The grid, the Zobrist hash and the pattern evaluator are updated
/// together on every `put`/`undo`, so they can never disagree.
#[derive(Debug, Clone)]
pub struct Board {
    size: usize,
    cells: Vec<Stone>,
    history: Vec<MoveRecord>,
    side_to_move: Stone,
    hasher: Hasher,
    evaluator: Evaluator,
}

/// Record of a move for undo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub pos: Pos,
    pub stone: Stone,
}

impl Board {
    /// Empty `size`x`size` board with Black to move.
    ///
    /// # Errors
    /// `BoardError::InvalidSize` when `size` is outside `MIN_SIZE..=MAX_SIZE`.
    pub fn new(size: usize) -> BoardResult<Self> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(BoardError::InvalidSize {
                size,
                min: MIN_SIZE,
                max: MAX_SIZE,
            });
        }
        Ok(Self {
            size,
            cells: vec![Stone::Empty; size * size],
            history: Vec::with_capacity(size * size),
            side_to_move: Stone::Black,
            hasher: Hasher::new(size),
            evaluator: Evaluator::new(size),
        })
    }

    /// Adopt an external snapshot given as square rows.
    ///
    /// The snapshot carries no history. Side to move is Black when both
    /// colors have the same stone count, White otherwise; use
    /// [`set_side_to_move`](Self::set_side_to_move) to override.
    pub fn from_rows<R: AsRef<[Stone]>>(rows: &[R]) -> BoardResult<Self> {
        let mut board = Self::new(rows.len())?;
        let size = board.size;

        let mut black = 0usize;
        let mut white = 0usize;
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != size {
                return Err(BoardError::RaggedSnapshot {
                    row: r,
                    len: row.len(),
                    expected: size,
                });
            }
            for (c, &stone) in row.iter().enumerate() {
                match stone {
                    Stone::Black => black += 1,
                    Stone::White => white += 1,
                    Stone::Empty => continue,
                }
                let pos = Pos::new(r as u8, c as u8);
                board.cells[pos.to_index(size)] = stone;
                board.evaluator.set_raw(pos, stone);
            }
        }

        board.hasher.rebuild_full(&board.cells);
        board.evaluator.rebuild();
        board.side_to_move = if black == white { Stone::Black } else { Stone::White };
        Ok(board)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get stone at position (`Empty` when off the board)
    #[inline]
    pub fn get(&self, pos: Pos) -> Stone {
        if self.in_bounds(pos) {
            self.cells[pos.to_index(self.size)]
        } else {
            Stone::Empty
        }
    }

    #[inline]
    pub fn in_bounds(&self, pos: Pos) -> bool {
        (pos.row as usize) < self.size && (pos.col as usize) < self.size
    }

    /// Check if position is on the board and empty
    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        self.in_bounds(pos) && self.cells[pos.to_index(self.size)] == Stone::Empty
    }

    /// Place `stone` at `pos` and pass the turn.
    ///
    /// # Errors
    /// Fails without changing anything if `pos` is off the board or
    /// occupied, or if `stone` is `Empty`.
    pub fn put(&mut self, pos: Pos, stone: Stone) -> BoardResult<()> {
        if !stone.is_player() {
            return Err(BoardError::EmptyStone);
        }
        if !self.in_bounds(pos) {
            return Err(BoardError::OutOfBounds {
                row: i32::from(pos.row),
                col: i32::from(pos.col),
                size: self.size,
            });
        }
        let idx = pos.to_index(self.size);
        if self.cells[idx] != Stone::Empty {
            return Err(BoardError::Occupied { pos });
        }

        self.cells[idx] = stone;
        self.hasher.toggle(pos, stone);
        self.evaluator.move_stone(pos, stone);
        self.history.push(MoveRecord { pos, stone });
        self.side_to_move = stone.opponent();
        Ok(())
    }

    /// Place a stone for the side to move.
    pub fn play(&mut self, pos: Pos) -> BoardResult<()> {
        self.put(pos, self.side_to_move)
    }

    /// Take back the most recent move.
    ///
    /// # Errors
    /// `BoardError::NoHistory` when no move has been recorded.
    pub fn undo(&mut self) -> BoardResult<MoveRecord> {
        let record = self.history.pop().ok_or(BoardError::NoHistory)?;
        self.cells[record.pos.to_index(self.size)] = Stone::Empty;
        self.hasher.toggle(record.pos, record.stone);
        self.evaluator.undo_stone(record.pos);
        self.side_to_move = record.stone;
        Ok(record)
    }

    /// Independent copy with the same grid, history and hash.
    ///
    /// The Zobrist key table is shared; everything mutable is copied.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }

    #[inline]
    pub fn side_to_move(&self) -> Stone {
        self.side_to_move
    }

    #[inline]
    pub fn set_side_to_move(&mut self, side: Stone) {
        if side.is_player() {
            self.side_to_move = side;
        }
    }

    /// Current Zobrist hash (occupancy only)
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hasher.hash()
    }

    #[inline]
    pub fn hasher(&self) -> &Hasher {
        &self.hasher
    }

    #[inline]
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Static evaluation from `perspective`'s point of view
    #[inline]
    pub fn evaluate(&self, perspective: Stone) -> i32 {
        self.evaluator.evaluate(perspective)
    }

    /// Candidate moves for `player` at the given remaining depth
    #[inline]
    pub fn candidates(&self, player: Stone, depth: i32, filter: MoveFilter, cap: usize) -> Vec<Pos> {
        self.evaluator.moves(player, depth, filter, cap)
    }

    /// True if `stone` at `pos` makes five or more in a row.
    ///
    /// Works both for an empty cell (hypothetical move) and for a cell the
    /// stone already occupies.
    #[inline]
    pub fn is_winning_move(&self, pos: Pos, stone: Stone) -> bool {
        stone.is_player() && self.in_bounds(pos) && has_five_at_pos(self, pos, stone)
    }

    /// Total stones on board
    #[inline]
    pub fn stone_count(&self) -> usize {
        self.evaluator.stone_count()
    }

    #[inline]
    pub fn is_board_empty(&self) -> bool {
        self.stone_count() == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.stone_count() == self.cells.len()
    }

    #[inline]
    pub fn last_move(&self) -> Option<MoveRecord> {
        self.history.last().copied()
    }

    #[inline]
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// Row-major cell slice
    #[inline]
    pub fn cells(&self) -> &[Stone] {
        &self.cells
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for c in 0..self.size {
            write!(f, "{:>3}", c)?;
        }
        writeln!(f)?;
        for r in 0..self.size {
            write!(f, "{:>3}", r)?;
            for c in 0..self.size {
                let symbol = match self.cells[r * self.size + c] {
                    Stone::Black => 'X',
                    Stone::White => 'O',
                    Stone::Empty => '.',
                };
                write!(f, "{:>3}", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
