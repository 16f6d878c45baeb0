//! Difficulty levels
//!
//! A level fixes how deep and how long the engine searches, and how often it
//! deliberately plays one of the runner-up moves instead of the best one.
//! This is the only place randomness enters move selection.

use std::fmt;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::Pos;
use crate::error::ConfigError;
use crate::search::RootMove;

/// Discrete strength levels, 1 (weakest) to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Difficulty {
    Beginner = 1,
    Easy = 2,
    Medium = 3,
    Hard = 4,
    Expert = 5,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Beginner,
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    #[inline]
    pub fn level(self) -> u8 {
        self as u8
    }

    /// Search and selection settings for this level.
    #[must_use]
    pub fn settings(self) -> DifficultySettings {
        let (max_depth, budget_ms, top_n, random_chance) = match self {
            Difficulty::Beginner => (2, 200, 5, 0.6),
            Difficulty::Easy => (4, 500, 3, 0.35),
            Difficulty::Medium => (6, 1_000, 2, 0.15),
            Difficulty::Hard => (8, 2_000, 2, 0.05),
            Difficulty::Expert => (10, 4_000, 1, 0.0),
        };
        DifficultySettings {
            max_depth,
            time_budget: Duration::from_millis(budget_ms),
            top_n,
            random_chance,
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = ConfigError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Difficulty::Beginner),
            2 => Ok(Difficulty::Easy),
            3 => Ok(Difficulty::Medium),
            4 => Ok(Difficulty::Hard),
            5 => Ok(Difficulty::Expert),
            other => Err(ConfigError::UnknownLevel(other)),
        }
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> u8 {
        d.level()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        };
        write!(f, "{name} ({})", self.level())
    }
}

/// What a difficulty level means for one move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultySettings {
    /// Iterative deepening ceiling
    pub max_depth: i32,
    pub time_budget: Duration,
    /// Size of the pool a randomized pick is drawn from
    pub top_n: usize,
    /// Probability of drawing from the pool instead of taking the best move
    pub random_chance: f64,
}

impl DifficultySettings {
    /// # Errors
    /// Rejects a zero depth, an empty pool or a probability outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth < 1 {
            return Err(ConfigError::InvalidDepth(self.max_depth.clamp(0, 255) as u8));
        }
        if self.top_n == 0 {
            return Err(ConfigError::InvalidCandidateCap(0));
        }
        if !(0.0..=1.0).contains(&self.random_chance) {
            return Err(ConfigError::InvalidRandomChance(self.random_chance));
        }
        Ok(())
    }

    /// Pick a move from a best-first ranking.
    ///
    /// With probability `random_chance` the move is drawn uniformly from the
    /// first `top_n` entries; otherwise the first entry is returned.
    pub fn select<R: Rng + ?Sized>(&self, ranked: &[RootMove], rng: &mut R) -> Option<Pos> {
        let best = ranked.first()?;
        let pool = self.top_n.min(ranked.len());
        if pool > 1 && self.random_chance > 0.0 && rng.gen_bool(self.random_chance.min(1.0)) {
            Some(ranked[rng.gen_range(0..pool)].pos)
        } else {
            Some(best.pos)
        }
    }
}
