//! Move-ordering heuristics kept across searches
//!
//! - Killer moves: quiet moves that caused a beta cutoff at the same
//!   remaining depth, two slots per depth.
//! - History: per side and cell, `depth²` added on every cutoff.

use crate::board::{Pos, Stone};

/// Initial number of depth slots; the table grows on demand
const INITIAL_DEPTHS: usize = 64;

/// Two most recent distinct cutoff moves per remaining depth.
#[derive(Debug, Clone)]
pub struct KillerTable {
    slots: Vec<[Option<Pos>; 2]>,
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KillerTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: vec![[None; 2]; INITIAL_DEPTHS],
        }
    }

    /// Record a cutoff move. The newest move takes slot 0; a move already in
    /// slot 0 is not duplicated.
    pub fn record(&mut self, depth: i32, pos: Pos) {
        let Ok(d) = usize::try_from(depth) else {
            return;
        };
        if d >= self.slots.len() {
            self.slots.resize(d + 1, [None; 2]);
        }
        let slot = &mut self.slots[d];
        if slot[0] != Some(pos) {
            slot[1] = slot[0];
            slot[0] = Some(pos);
        }
    }

    /// Killer moves for a depth, newest first.
    #[inline]
    pub fn get(&self, depth: i32) -> [Option<Pos>; 2] {
        usize::try_from(depth)
            .ok()
            .and_then(|d| self.slots.get(d).copied())
            .unwrap_or([None; 2])
    }

    #[inline]
    pub fn is_killer(&self, depth: i32, pos: Pos) -> bool {
        self.get(depth).contains(&Some(pos))
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = [None; 2]);
    }
}

/// Accumulated cutoff rewards per (side, cell).
#[derive(Debug, Clone)]
pub struct HistoryTable {
    size: usize,
    /// `scores[player_index][cell index]`
    scores: [Vec<i32>; 2],
}

impl HistoryTable {
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            size,
            scores: [vec![0; size * size], vec![0; size * size]],
        }
    }

    /// Add `depth²` for a cutoff by `side` at `pos`.
    pub fn reward(&mut self, side: Stone, pos: Pos, depth: i32) {
        let Some(p) = side.player_index() else {
            return;
        };
        let idx = pos.to_index(self.size);
        if let Some(score) = self.scores[p].get_mut(idx) {
            *score = score.saturating_add(depth.saturating_mul(depth));
        }
    }

    #[inline]
    pub fn score(&self, side: Stone, pos: Pos) -> i32 {
        side.player_index()
            .and_then(|p| self.scores[p].get(pos.to_index(self.size)).copied())
            .unwrap_or(0)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn clear(&mut self) {
        for table in &mut self.scores {
            table.fill(0);
        }
    }
}
