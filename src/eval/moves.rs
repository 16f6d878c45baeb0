//! Candidate move generation from the evaluator caches
//!
//! Moves are grouped into threat tiers so the search sees the forcing
//! replies first. A winning move or a forced block short-circuits every
//! other tier.

use crate::board::{Pos, Stone};

use super::evaluator::Evaluator;
use super::patterns::Shape;

/// Default number of candidates handed to the search at each node
pub const DEFAULT_CANDIDATE_CAP: usize = 20;

/// Smallest quiet list used near the leaves
const NARROW_FLOOR: usize = 8;

/// Restricts generation to forcing moves (used by quiescence).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveFilter {
    /// Own moves that make a three or better
    pub only_three: bool,
    /// Own moves that make a four or better
    pub only_four: bool,
}

impl MoveFilter {
    /// Every tier.
    pub const ALL: MoveFilter = MoveFilter {
        only_three: false,
        only_four: false,
    };

    /// Fours and threes, used by quiescence.
    pub const FORCING: MoveFilter = MoveFilter {
        only_three: true,
        only_four: true,
    };

    #[inline]
    pub fn is_forcing(self) -> bool {
        self.only_three || self.only_four
    }
}

#[inline]
fn is_major(shape: Shape) -> bool {
    matches!(
        shape,
        Shape::Four | Shape::FourFour | Shape::FourThree | Shape::ThreeThree
    )
}

impl Evaluator {
    /// Candidate moves for `player`, best first.
    ///
    /// `depth` is the remaining search depth; at depth 2 or less the list is
    /// narrowed to `max(cap / 2, 8)`.
    pub fn moves(&self, player: Stone, depth: i32, filter: MoveFilter, cap: usize) -> Vec<Pos> {
        let Some(me) = player.player_index() else {
            return Vec::new();
        };
        let opp = 1 - me;

        if self.stone_count() == 0 {
            return if filter.is_forcing() {
                Vec::new()
            } else {
                vec![Pos::center(self.size())]
            };
        }

        let mut wins = Vec::new();
        let mut blocks = Vec::new();
        let mut majors = Vec::new();
        let mut fours = Vec::new();
        let mut threes = Vec::new();
        let mut rest = Vec::new();
        let mut forcing = Vec::new();

        for pos in self.empty_cells() {
            let info = self.cell_info(pos);
            let (own, own_score) = info[me];
            let (theirs, their_score) = info[opp];

            if own == Shape::Five {
                wins.push(pos);
                continue;
            }
            if theirs == Shape::Five {
                blocks.push(pos);
                continue;
            }
            if !wins.is_empty() || !blocks.is_empty() {
                continue;
            }

            if filter.is_forcing() {
                let keep = if filter.only_three {
                    own.makes_three()
                } else {
                    own.makes_four()
                };
                if keep {
                    forcing.push((pos, own_score));
                }
                continue;
            }

            let key = own_score + their_score;
            if is_major(own) || is_major(theirs) {
                majors.push((pos, key));
            } else if own == Shape::BlockedFour || theirs == Shape::BlockedFour {
                fours.push((pos, key));
            } else if own == Shape::Three || theirs == Shape::Three {
                threes.push((pos, key));
            } else if key > 0 {
                rest.push((pos, key));
            }
        }

        if !wins.is_empty() {
            return wins;
        }
        if !blocks.is_empty() {
            return blocks;
        }

        if filter.is_forcing() {
            sort_by_score(&mut forcing);
            forcing.truncate(cap);
            return forcing.into_iter().map(|(pos, _)| pos).collect();
        }

        for tier in [&mut majors, &mut fours, &mut threes, &mut rest] {
            sort_by_score(tier);
        }

        let mut out: Vec<Pos> = majors
            .into_iter()
            .chain(fours)
            .chain(threes)
            .chain(rest)
            .map(|(pos, _)| pos)
            .collect();

        if out.is_empty() {
            out = self.empty_cells().collect();
        }

        let limit = if depth <= 2 {
            (cap / 2).max(NARROW_FLOOR).min(cap)
        } else {
            cap
        };
        out.truncate(limit.max(1));
        out
    }
}

/// Highest score first; the stable sort keeps row-major order on ties.
fn sort_by_score(tier: &mut [(Pos, i32)]) {
    tier.sort_by(|a, b| b.1.cmp(&a.1));
}
