//! Zobrist hashing for position identification
//!
//! Zobrist hashing allows O(1) incremental hash updates when placing/removing stones.
//! The hash is a pure function of board occupancy: side to move is kept out of
//! it and paired with the hash in the transposition key instead.
//!
//! # Example
//!
//! ```
//! use gomoku_ai::board::{Pos, Stone};
//! use gomoku_ai::search::Hasher;
//!
//! let mut hasher = Hasher::new(15);
//! assert_eq!(hasher.hash(), 0);
//!
//! hasher.toggle(Pos::new(7, 7), Stone::Black);
//! assert_ne!(hasher.hash(), 0);
//!
//! // XOR is its own inverse: toggling again removes the stone
//! hasher.toggle(Pos::new(7, 7), Stone::Black);
//! assert_eq!(hasher.hash(), 0);
//! ```

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::{Pos, Stone};

/// Seed for key generation. Fixed so every table built for the same board
/// size holds the same keys, which keeps opening-book hashes stable.
const ZOBRIST_SEED: u64 = 0x1234_5678_9ABC_DEF0;

/// Random keys for each (cell, stone color) combination.
#[derive(Debug)]
pub struct ZobristTable {
    size: usize,
    /// `keys[cell][player_index]`
    keys: Vec<[u64; 2]>,
}

impl ZobristTable {
    /// Create a key table for a `size`x`size` board.
    #[must_use]
    pub fn new(size: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED ^ size as u64);
        let keys = (0..size * size)
            .map(|_| [rng.gen::<u64>(), rng.gen::<u64>()])
            .collect();
        Self { size, keys }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Key for a stone at a position (0 for `Empty`).
    #[inline]
    #[must_use]
    pub fn key(&self, pos: Pos, stone: Stone) -> u64 {
        match stone.player_index() {
            Some(p) => self.keys[pos.to_index(self.size)][p],
            None => 0,
        }
    }

    /// Compute the full hash of a row-major cell slice.
    #[must_use]
    pub fn hash_cells(&self, cells: &[Stone]) -> u64 {
        cells
            .iter()
            .enumerate()
            .filter_map(|(idx, &stone)| {
                stone
                    .player_index()
                    .map(|p| self.keys[idx][p])
            })
            .fold(0u64, |h, k| h ^ k)
    }
}

/// Running position hash owned by a [`Board`](crate::board::Board).
///
/// The key table is shared between copies of a board, so cloning a hasher
/// only copies the running value.
#[derive(Debug, Clone)]
pub struct Hasher {
    table: Arc<ZobristTable>,
    hash: u64,
}

impl Hasher {
    /// Hasher for an empty `size`x`size` board.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self::with_table(Arc::new(ZobristTable::new(size)))
    }

    /// Hasher sharing an existing key table.
    #[must_use]
    pub fn with_table(table: Arc<ZobristTable>) -> Self {
        Self { table, hash: 0 }
    }

    /// XOR the key for (pos, stone) into the running hash.
    ///
    /// The same call places and removes a stone's contribution.
    #[inline]
    pub fn toggle(&mut self, pos: Pos, stone: Stone) {
        self.hash ^= self.table.key(pos, stone);
    }

    /// Current 64-bit hash.
    #[inline]
    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Recompute the hash from scratch. O(N²); used when adopting a snapshot.
    pub fn rebuild_full(&mut self, cells: &[Stone]) {
        self.hash = self.table.hash_cells(cells);
    }

    /// Shared key table.
    #[inline]
    pub fn table(&self) -> &Arc<ZobristTable> {
        &self.table
    }
}
