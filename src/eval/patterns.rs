//! Pattern scores and line shape classification
//!
//! A shape describes what a single line becomes if a player drops a stone on
//! an empty cell. Only the eight neighbours within distance four matter: any
//! five through the cell lies inside that window. Each neighbour is reduced
//! to empty / own / blocked, giving 3^8 distinct windows, all classified
//! once into a lookup table.

use std::sync::OnceLock;

/// Pattern scores for evaluation
pub struct PatternScore;

impl PatternScore {
    // Winning pattern
    /// Five in a row - immediate win
    pub const FIVE: i32 = 10_000_000;

    // Strong attacking patterns
    /// Open four: _OOOO_ (two ways to complete, cannot be stopped)
    pub const FOUR: i32 = 100_000;
    /// Two fours at one cell: as good as an open four
    pub const FOUR_FOUR: i32 = 100_000;
    /// Four plus open three at one cell: the three promotes after the block
    pub const FOUR_THREE: i32 = 100_000;
    /// Two open threes at one cell: only one can be blocked
    pub const THREE_THREE: i32 = 50_000;
    /// Blocked four: XOOOO_ or O_OOO (exactly one completion point)
    pub const BLOCKED_FOUR: i32 = 1_500;

    // Moderate threats
    /// Open three: _OOO_ (becomes an open four if not answered)
    pub const THREE: i32 = 1_000;
    /// Blocked three: XOOO__ (can only reach a blocked four)
    pub const BLOCKED_THREE: i32 = 150;

    // Building patterns
    /// Open two: _OO_
    pub const TWO: i32 = 100;
    /// Blocked two: XOO___
    pub const BLOCKED_TWO: i32 = 15;

    /// Static evaluations are clamped to this magnitude. It stays below
    /// `FIVE / 2`, the score from which the search treats a move as a
    /// forced win, however many unanswered threats a position holds.
    pub const EVAL_LIMIT: i32 = Self::FIVE / 2 - 1;
}

/// Shape classification for one direction, or a composite for a cell.
///
/// Variants are ordered by strength so `max` picks the strongest single
/// direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Shape {
    #[default]
    None,
    BlockedTwo,
    Two,
    BlockedThree,
    Three,
    BlockedFour,
    ThreeThree,
    FourThree,
    FourFour,
    Four,
    Five,
}

impl Shape {
    /// Score constant for this shape
    #[inline]
    pub fn score(self) -> i32 {
        match self {
            Shape::None => 0,
            Shape::BlockedTwo => PatternScore::BLOCKED_TWO,
            Shape::Two => PatternScore::TWO,
            Shape::BlockedThree => PatternScore::BLOCKED_THREE,
            Shape::Three => PatternScore::THREE,
            Shape::BlockedFour => PatternScore::BLOCKED_FOUR,
            Shape::ThreeThree => PatternScore::THREE_THREE,
            Shape::FourThree => PatternScore::FOUR_THREE,
            Shape::FourFour => PatternScore::FOUR_FOUR,
            Shape::Four => PatternScore::FOUR,
            Shape::Five => PatternScore::FIVE,
        }
    }

    /// Composite shapes only arise from combining directions
    #[inline]
    pub fn is_composite(self) -> bool {
        matches!(self, Shape::ThreeThree | Shape::FourThree | Shape::FourFour)
    }

    /// Shapes that threaten five on the very next move
    #[inline]
    pub fn makes_four(self) -> bool {
        matches!(
            self,
            Shape::BlockedFour | Shape::FourThree | Shape::FourFour | Shape::Four | Shape::Five
        )
    }

    /// Shapes at least as forcing as an open three
    #[inline]
    pub fn makes_three(self) -> bool {
        self.makes_four() || matches!(self, Shape::Three | Shape::ThreeThree)
    }
}

/// One neighbour of the classified cell, from the mover's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCell {
    Empty,
    Own,
    /// Opponent stone or board edge
    Blocked,
}

impl LineCell {
    #[inline]
    fn digit(self) -> usize {
        match self {
            LineCell::Empty => 0,
            LineCell::Own => 1,
            LineCell::Blocked => 2,
        }
    }
}

/// Neighbours ordered by offset `-4, -3, -2, -1, +1, +2, +3, +4`.
pub type Neighbours = [LineCell; 8];

const WINDOW: usize = 9;
const CENTER: usize = 4;
const TABLE_SIZE: usize = 6561; // 3^8
const POW3: [usize; 8] = [1, 3, 9, 27, 81, 243, 729, 2187];

/// Base-3 index of a neighbour window
#[inline]
pub fn pattern_index(neighbours: &Neighbours) -> usize {
    neighbours
        .iter()
        .zip(POW3.iter())
        .map(|(cell, p)| cell.digit() * p)
        .sum()
}

/// Classify one line through a hypothetical stone.
#[inline]
pub fn classify(neighbours: &Neighbours) -> Shape {
    pattern_table()[pattern_index(neighbours)]
}

fn pattern_table() -> &'static [Shape] {
    static TABLE: OnceLock<Vec<Shape>> = OnceLock::new();
    TABLE.get_or_init(build_pattern_table)
}

/// Window digit for neighbour slot `i` (0..8) mapped onto the 9-cell line
#[inline]
fn window_slot(i: usize) -> usize {
    if i < CENTER {
        i
    } else {
        i + 1
    }
}

fn decode(idx: usize) -> [u8; WINDOW] {
    let mut window = [0u8; WINDOW];
    window[CENTER] = 1;
    let mut rest = idx;
    for i in 0..8 {
        window[window_slot(i)] = (rest % 3) as u8;
        rest /= 3;
    }
    window
}

/// Length of the own run through the centre
fn run_through_center(window: &[u8; WINDOW]) -> usize {
    let left = window[..CENTER].iter().rev().take_while(|&&d| d == 1).count();
    let right = window[CENTER + 1..].iter().take_while(|&&d| d == 1).count();
    1 + left + right
}

/// Builds the table from the strongest windows down: placing a stone on
/// an empty neighbour turns digit 0 into 1, so every child index is larger
/// and already classified.
///
/// - run through the centre of 5+ is `Five`
/// - two or more cells completing five is `Four`, exactly one `BlockedFour`
/// - otherwise a window is `Three` / `BlockedThree` when one more stone
///   yields `Four` / `BlockedFour`, and `Two` / `BlockedTwo` when one more
///   stone yields `Three` / `BlockedThree`
fn build_pattern_table() -> Vec<Shape> {
    let mut table = vec![Shape::None; TABLE_SIZE];

    for idx in (0..TABLE_SIZE).rev() {
        let window = decode(idx);
        if run_through_center(&window) >= 5 {
            table[idx] = Shape::Five;
            continue;
        }

        let mut completions = 0;
        let mut best_child = Shape::None;
        for (i, p) in POW3.iter().enumerate() {
            if window[window_slot(i)] != 0 {
                continue;
            }
            let child = table[idx + p];
            if child == Shape::Five {
                completions += 1;
            } else {
                best_child = best_child.max(child);
            }
        }

        table[idx] = match (completions, best_child) {
            (2.., _) => Shape::Four,
            (1, _) => Shape::BlockedFour,
            (0, Shape::Four) => Shape::Three,
            (0, Shape::BlockedFour) => Shape::BlockedThree,
            (0, Shape::Three) => Shape::Two,
            (0, Shape::BlockedThree) => Shape::BlockedTwo,
            _ => Shape::None,
        };
    }

    table
}

/// Combine the four directional shapes of one cell.
///
/// Returns the cell's headline shape and its point score. A composite
/// raises the score to its constant rather than adding to the sum.
pub fn combine(dirs: &[Shape; 4]) -> (Shape, i32) {
    let sum: i32 = dirs.iter().map(|s| s.score()).sum();

    let count = |shape: Shape| dirs.iter().filter(|&&s| s == shape).count();
    let fives = count(Shape::Five);
    let fours = count(Shape::Four);
    let blocked_fours = count(Shape::BlockedFour);
    let threes = count(Shape::Three);

    if fives > 0 {
        return (Shape::Five, sum);
    }

    let composite = if fours >= 1 && threes >= 1 {
        Some(Shape::FourThree)
    } else if fours + blocked_fours >= 2 {
        Some(Shape::FourFour)
    } else if blocked_fours >= 1 && threes >= 1 {
        Some(Shape::FourThree)
    } else if threes >= 2 && fours == 0 {
        Some(Shape::ThreeThree)
    } else {
        None
    };

    match composite {
        Some(shape) => (shape, sum.max(shape.score())),
        None => {
            let strongest = dirs.iter().copied().max().unwrap_or_default();
            (strongest, sum)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use super::LineCell::{Blocked as B, Empty as E, Own as X};

    /// Literal line from -4..=+4 with the centre omitted
    fn line(cells: [LineCell; 8]) -> Shape {
        classify(&cells)
    }

    /// Reference classifier: enumerates every five-cell window through the
    /// centre instead of measuring runs, and recurses instead of walking the
    /// table in index order.
    fn brute_force(window: [u8; WINDOW], memo: &mut HashMap<[u8; WINDOW], Shape>) -> Shape {
        if let Some(&shape) = memo.get(&window) {
            return shape;
        }
        let completes = |w: &[u8; WINDOW]| {
            (0..=CENTER).any(|start| w[start..start + 5].iter().all(|&d| d == 1))
        };
        let shape = if completes(&window) {
            Shape::Five
        } else {
            let mut completions = 0;
            let mut best = Shape::None;
            for slot in (0..WINDOW).filter(|&s| s != CENTER && window[s] == 0) {
                let mut child = window;
                child[slot] = 1;
                match brute_force(child, memo) {
                    Shape::Five => completions += 1,
                    other => best = best.max(other),
                }
            }
            match (completions, best) {
                (2.., _) => Shape::Four,
                (1, _) => Shape::BlockedFour,
                (0, Shape::Four) => Shape::Three,
                (0, Shape::BlockedFour) => Shape::BlockedThree,
                (0, Shape::Three) => Shape::Two,
                (0, Shape::BlockedThree) => Shape::BlockedTwo,
                _ => Shape::None,
            }
        };
        memo.insert(window, shape);
        shape
    }

    #[test]
    fn test_pattern_score_hierarchy() {
        assert!(PatternScore::FIVE > PatternScore::FOUR * 10);
        assert!(PatternScore::FOUR > PatternScore::BLOCKED_FOUR);
        assert!(PatternScore::BLOCKED_FOUR > PatternScore::THREE);
        assert!(PatternScore::THREE > PatternScore::BLOCKED_THREE);
        assert!(PatternScore::BLOCKED_THREE > PatternScore::TWO);
        assert!(PatternScore::TWO > PatternScore::BLOCKED_TWO);
        assert!(PatternScore::THREE_THREE > PatternScore::THREE);
        assert!(PatternScore::FOUR_THREE > PatternScore::THREE_THREE);
        assert!(PatternScore::EVAL_LIMIT < PatternScore::FIVE / 2);
    }

    #[test]
    fn test_open_four() {
        // _XXX[X]_ : three own stones to the left, open both ends
        assert_eq!(line([E, X, X, X, E, E, E, E]), Shape::Four);
    }

    #[test]
    fn test_blocked_four() {
        // OXXX[X]_
        assert_eq!(line([B, X, X, X, E, E, E, E]), Shape::BlockedFour);
        // XXX[X]O with room on the left
        assert_eq!(line([E, X, X, X, B, E, E, E]), Shape::BlockedFour);
    }

    #[test]
    fn test_gapped_fours_are_blocked_fours() {
        // X_[X]XX : filling the gap is the only completion, even with open ends
        assert_eq!(line([E, E, X, E, X, X, E, E]), Shape::BlockedFour);
        // OX_X[X]XO
        assert_eq!(line([B, X, E, X, X, B, E, E]), Shape::BlockedFour);
        // XX_[X]X
        assert_eq!(line([E, X, X, E, X, B, E, E]), Shape::BlockedFour);
    }

    #[test]
    fn test_five_regardless_of_ends() {
        assert_eq!(line([X, X, X, X, E, E, E, E]), Shape::Five);
        assert_eq!(line([B, B, X, X, X, X, B, B]), Shape::Five);
        assert_eq!(line([B, X, X, X, X, B, B, B]), Shape::Five);
        // overline
        assert_eq!(line([X, X, X, X, X, X, X, X]), Shape::Five);
    }

    #[test]
    fn test_threes() {
        // __X[X]X__ : open three
        assert_eq!(line([E, E, E, X, X, E, E, E]), Shape::Three);
        // _X_[X]X_ : split three
        assert_eq!(line([E, E, X, E, X, E, E, E]), Shape::Three);
        // OX[X]X__ : blocked three
        assert_eq!(line([E, E, B, X, X, E, E, E]), Shape::BlockedThree);
        // |_X[X]X_| squeezed into five cells can only become a blocked four
        assert_eq!(line([B, B, E, X, X, E, B, B]), Shape::BlockedThree);
    }

    #[test]
    fn test_twos() {
        assert_eq!(line([E, E, E, X, E, E, E, E]), Shape::Two);
        assert_eq!(line([E, E, B, X, E, E, E, E]), Shape::BlockedTwo);
    }

    #[test]
    fn test_dead_line() {
        // O X [X] O : no room for five
        assert_eq!(line([E, E, B, X, B, E, E, E]), Shape::None);
        assert_eq!(line([B, B, B, B, B, B, B, B]), Shape::None);
    }

    #[test]
    fn test_table_matches_brute_force_exhaustively() {
        let mut memo = HashMap::new();
        for idx in 0..TABLE_SIZE {
            let window = decode(idx);
            assert_eq!(
                pattern_table()[idx],
                brute_force(window, &mut memo),
                "window {:?} classified differently",
                window
            );
        }
    }

    #[test]
    fn test_pattern_index_roundtrip() {
        let cells = [E, X, B, E, X, X, B, E];
        let window = decode(pattern_index(&cells));
        for (i, cell) in cells.iter().enumerate() {
            assert_eq!(window[window_slot(i)] as usize, cell.digit());
        }
    }

    #[test]
    fn test_combine_composites() {
        let (shape, score) = combine(&[Shape::BlockedFour, Shape::Three, Shape::None, Shape::None]);
        assert_eq!(shape, Shape::FourThree);
        assert_eq!(score, PatternScore::FOUR_THREE);

        let (shape, _) = combine(&[Shape::BlockedFour, Shape::BlockedFour, Shape::Two, Shape::None]);
        assert_eq!(shape, Shape::FourFour);

        let (shape, score) = combine(&[Shape::Three, Shape::Three, Shape::None, Shape::None]);
        assert_eq!(shape, Shape::ThreeThree);
        assert_eq!(score, PatternScore::THREE_THREE);

        let (shape, _) = combine(&[Shape::Four, Shape::Three, Shape::None, Shape::None]);
        assert_eq!(shape, Shape::FourThree);
    }

    #[test]
    fn test_combine_single_and_five() {
        let (shape, score) = combine(&[Shape::Three, Shape::Two, Shape::None, Shape::None]);
        assert_eq!(shape, Shape::Three);
        assert_eq!(score, PatternScore::THREE + PatternScore::TWO);

        let (shape, score) = combine(&[Shape::Five, Shape::Three, Shape::Three, Shape::None]);
        assert_eq!(shape, Shape::Five);
        assert!(score >= PatternScore::FIVE);
    }
}
