//! Transposition Table for caching search results
//!
//! The transposition table stores search results keyed by board hash and
//! side to move, enabling reuse of previous search results for positions
//! reached through a different move order.
//!
//! # Example
//!
//! ```
//! use gomoku_ai::board::{Pos, Stone};
//! use gomoku_ai::search::{EntryType, TTKey, TTWindow, TranspositionTable};
//!
//! let mut tt = TranspositionTable::new();
//!
//! // Store a search result
//! let key = TTKey::new(0x1234_5678_9ABC_DEF0, Stone::Black);
//! tt.store(key, 5, 100, EntryType::Exact, Some(Pos::new(7, 7)));
//!
//! // Probe for the result
//! let entry = tt.probe(key).unwrap();
//! assert_eq!(entry.narrow(5, -1000, 1000), TTWindow::Cutoff(100));
//! assert_eq!(entry.best_move, Some(Pos::new(7, 7)));
//! ```

use std::collections::HashMap;

use tracing::trace;

use crate::board::{Pos, Stone};

/// Entry type for score interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// Exact score - the search completed normally
    Exact,
    /// Lower bound - score >= stored value (beta cutoff)
    LowerBound,
    /// Upper bound - score <= stored value (alpha fail-low)
    UpperBound,
}

/// Table key: occupancy hash plus the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TTKey {
    pub hash: u64,
    pub side: Stone,
}

impl TTKey {
    #[inline]
    pub fn new(hash: u64, side: Stone) -> Self {
        Self { hash, side }
    }
}

/// Transposition table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTEntry {
    /// Remaining depth this entry was searched to
    pub depth: i32,
    /// Score from `side`'s point of view
    pub score: i32,
    pub entry_type: EntryType,
    /// Best move found for this position
    pub best_move: Option<Pos>,
    pub side: Stone,
}

impl TTEntry {
    /// Apply this entry to a node searched to `depth` with window `(alpha, beta)`.
    ///
    /// Entries from a shallower search leave the window alone. An exact score
    /// settles the node; a bound narrows the window and settles it only if
    /// the window closes.
    #[inline]
    pub fn narrow(&self, depth: i32, alpha: i32, beta: i32) -> TTWindow {
        if self.depth < depth {
            return TTWindow::Search { alpha, beta };
        }
        let (alpha, beta) = match self.entry_type {
            EntryType::Exact => return TTWindow::Cutoff(self.score),
            EntryType::LowerBound => (alpha.max(self.score), beta),
            EntryType::UpperBound => (alpha, beta.min(self.score)),
        };
        if alpha >= beta {
            TTWindow::Cutoff(self.score)
        } else {
            TTWindow::Search { alpha, beta }
        }
    }
}

/// What a probed entry leaves for the search to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TTWindow {
    /// The stored score is the node's value
    Cutoff(i32),
    /// Keep searching with this window
    Search { alpha: i32, beta: i32 },
}

/// Transposition table for caching search results.
///
/// Writes always replace the existing entry for a key. With a capacity set,
/// inserting a new key into a full table flushes it first.
#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: HashMap<TTKey, TTEntry>,
    capacity: Option<usize>,
    flushes: u64,
}

impl TranspositionTable {
    /// Unbounded table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Table that flushes itself once it would exceed `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.map(|c| c.max(1)),
            flushes: 0,
        }
    }

    /// Probe the table for a position.
    ///
    /// Callers apply the stored bound with [`TTEntry::narrow`]; the best move
    /// is useful for ordering either way.
    #[must_use]
    pub fn probe(&self, key: TTKey) -> Option<&TTEntry> {
        self.entries.get(&key)
    }

    /// Get best move from the table for move ordering.
    #[must_use]
    pub fn get_best_move(&self, key: TTKey) -> Option<Pos> {
        self.entries.get(&key).and_then(|e| e.best_move)
    }

    /// Store a position in the table (last write wins).
    pub fn store(
        &mut self,
        key: TTKey,
        depth: i32,
        score: i32,
        entry_type: EntryType,
        best_move: Option<Pos>,
    ) {
        if let Some(cap) = self.capacity {
            if self.entries.len() >= cap && !self.entries.contains_key(&key) {
                trace!(entries = self.entries.len(), cap, "flushing transposition table");
                self.entries.clear();
                self.flushes += 1;
            }
        }
        self.entries.insert(
            key,
            TTEntry {
                depth,
                score,
                entry_type,
                best_move,
                side: key.side,
            },
        );
    }

    /// Clear all entries in the table.
    ///
    /// This should be called when starting a new game.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get statistics about table usage.
    #[must_use]
    pub fn stats(&self) -> TTStats {
        TTStats {
            entries: self.entries.len(),
            capacity: self.capacity,
            flushes: self.flushes,
        }
    }
}

/// Statistics about transposition table usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTStats {
    /// Entries currently stored
    pub entries: usize,
    /// Flush threshold, if any
    pub capacity: Option<usize>,
    /// Times the table was flushed for exceeding `capacity`
    pub flushes: u64,
}
