//! Opening book keyed by Zobrist hash
//!
//! A handful of canonical early lines, written relative to the centre and
//! expanded over the 8 symmetries of the square. Lookups are O(1); a hit is
//! trusted only if the suggested cell is still empty on the probed board
//! and the caller is the side the line expects to move.
//!
//! # Example
//!
//! ```
//! use gomoku_ai::board::{Board, Pos, Stone};
//! use gomoku_ai::book::OpeningBook;
//!
//! let book = OpeningBook::standard(15);
//! let board = Board::new(15).unwrap();
//! assert_eq!(book.probe(&board, Stone::Black), Some(Pos::new(7, 7)));
//! assert_eq!(book.probe(&board, Stone::White), None);
//! ```

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::board::{Board, Pos, Stone};
use crate::search::Hasher;

/// A line: moves played from the empty board (Black first), then the reply.
/// Offsets are `(row, col)` relative to the centre.
type Line = (&'static [(i32, i32)], (i32, i32));

const STANDARD_LINES: &[Line] = &[
    // Empty board: take the centre
    (&[], (0, 0)),
    // Centre opened: diagonal reply
    (&[(0, 0)], (-1, 1)),
    // Direct (orthogonal) second move: third stone on the diagonal
    (&[(0, 0), (-1, 0)], (-1, 1)),
    // Diagonal second move: extend the other diagonal
    (&[(0, 0), (-1, 1)], (1, 1)),
];

/// Apply symmetry `sym` (0..8) of the square to a centre-relative offset.
fn transform(sym: u8, r: i32, c: i32) -> (i32, i32) {
    match sym {
        0 => (r, c),
        1 => (c, -r),
        2 => (-r, -c),
        3 => (-c, r),
        4 => (r, -c),
        5 => (-r, c),
        6 => (c, r),
        _ => (-c, -r),
    }
}

/// Static map from position hash to a reply.
#[derive(Debug, Clone)]
pub struct OpeningBook {
    size: usize,
    moves: HashMap<u64, Pos>,
}

impl OpeningBook {
    /// Book with the built-in lines for a `size`x`size` board.
    #[must_use]
    pub fn standard(size: usize) -> Self {
        Self::from_lines(size, STANDARD_LINES)
    }

    fn from_lines(size: usize, lines: &[Line]) -> Self {
        let centre = Pos::center(size);
        let to_pos = |(r, c): (i32, i32)| {
            centre.offset(1, 0, r, size).and_then(|p| p.offset(0, 1, c, size))
        };

        let mut moves = HashMap::new();
        for &(sequence, reply) in lines {
            for sym in 0..8 {
                let mut hasher = Hasher::new(size);
                let mut stone = Stone::Black;
                let mut placed = Vec::with_capacity(sequence.len());
                let mut fits = true;

                for &(r, c) in sequence {
                    match to_pos(transform(sym, r, c)) {
                        Some(pos) => {
                            hasher.toggle(pos, stone);
                            placed.push(pos);
                            stone = stone.opponent();
                        }
                        None => {
                            fits = false;
                            break;
                        }
                    }
                }
                let (rr, rc) = reply;
                match to_pos(transform(sym, rr, rc)) {
                    Some(pos) if fits && !placed.contains(&pos) => {
                        // First line to claim a position keeps it
                        moves.entry(hasher.hash()).or_insert(pos);
                    }
                    _ => {}
                }
            }
        }

        debug!(size, entries = moves.len(), "opening book built");
        Self { size, moves }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Raw lookup by position hash.
    #[inline]
    pub fn lookup(&self, hash: u64) -> Option<Pos> {
        self.moves.get(&hash).copied()
    }

    /// Book reply for `side` on `board`, if it is known and still playable.
    ///
    /// Lines alternate from Black, so the side to move is implied by the
    /// stone count; asking for the other side misses.
    pub fn probe(&self, board: &Board, side: Stone) -> Option<Pos> {
        if board.size() != self.size || side != Self::line_mover(board) {
            return None;
        }
        let pos = self.lookup(board.hash())?;
        if board.is_empty(pos) {
            Some(pos)
        } else {
            warn!(%pos, hash = board.hash(), "stale opening book entry, falling back to search");
            None
        }
    }

    #[inline]
    fn line_mover(board: &Board) -> Stone {
        if board.stone_count() % 2 == 0 {
            Stone::Black
        } else {
            Stone::White
        }
    }

    #[cfg(test)]
    fn insert(&mut self, hash: u64, pos: Pos) {
        self.moves.insert(hash, pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(size: usize, moves: &[(u8, u8)]) -> Board {
        let mut board = Board::new(size).unwrap();
        for &(r, c) in moves {
            board.play(Pos::new(r, c)).unwrap();
        }
        board
    }

    #[test]
    fn test_empty_board_plays_centre() {
        for size in [9, 15, 19] {
            let book = OpeningBook::standard(size);
            let board = Board::new(size).unwrap();
            assert_eq!(book.probe(&board, board.side_to_move()), Some(Pos::center(size)));
        }
    }

    #[test]
    fn test_centre_reply_is_diagonal() {
        let book = OpeningBook::standard(15);
        let board = board_with(15, &[(7, 7)]);
        let reply = book.probe(&board, board.side_to_move()).unwrap();

        assert_eq!(reply, Pos::new(6, 8));
        assert_eq!(reply.row.abs_diff(7), 1);
        assert_eq!(reply.col.abs_diff(7), 1);
    }

    #[test]
    fn test_symmetric_lines_are_covered() {
        let book = OpeningBook::standard(15);
        // Direct opening in all four orientations
        for (r, c) in [(6, 7), (8, 7), (7, 6), (7, 8)] {
            let board = board_with(15, &[(7, 7), (r, c)]);
            let reply = book.probe(&board, board.side_to_move()).expect("book reply");
            assert!(board.is_empty(reply));
            assert_eq!(reply.row.abs_diff(7), 1);
            assert_eq!(reply.col.abs_diff(7), 1);
        }
        // Diagonal opening in all four orientations
        for (r, c) in [(6, 8), (8, 8), (8, 6), (6, 6)] {
            let board = board_with(15, &[(7, 7), (r, c)]);
            let reply = book.probe(&board, board.side_to_move()).expect("book reply");
            assert!(board.is_empty(reply));
        }
    }

    #[test]
    fn test_unknown_position_misses() {
        let book = OpeningBook::standard(15);
        let board = board_with(15, &[(0, 0)]);
        assert_eq!(book.probe(&board, board.side_to_move()), None);
    }

    #[test]
    fn test_book_hash_matches_board_hash() {
        let book = OpeningBook::standard(15);
        let board = board_with(15, &[(7, 7), (6, 8)]);
        assert!(book.lookup(board.hash()).is_some());
    }

    #[test]
    fn test_stale_entry_falls_through() {
        let board = board_with(15, &[(7, 7)]);
        let mut book = OpeningBook::standard(15);
        // Point the current position at an occupied cell
        book.insert(board.hash(), Pos::new(7, 7));
        assert_eq!(book.probe(&board, board.side_to_move()), None);
    }

    #[test]
    fn test_wrong_side_misses() {
        let book = OpeningBook::standard(15);
        let empty = Board::new(15).unwrap();
        assert_eq!(book.probe(&empty, Stone::White), None);

        let opened = board_with(15, &[(7, 7)]);
        assert_eq!(book.probe(&opened, Stone::Black), None);
        assert_eq!(book.probe(&opened, Stone::White), Some(Pos::new(6, 8)));
    }

    #[test]
    fn test_size_mismatch_misses() {
        let book = OpeningBook::standard(15);
        let board = Board::new(19).unwrap();
        assert_eq!(book.probe(&board, board.side_to_move()), None);
    }
}
