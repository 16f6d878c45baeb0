//! Incrementally maintained pattern evaluator
//!
//! The evaluator mirrors the board on a padded `(N+2)x(N+2)` grid whose
//! border squares are walls, so line scans never need bounds checks. For
//! every empty cell it caches, per player, the shape each of the four lines
//! would take if that player played there, plus the combined point score.
//! Placing or removing a stone only refreshes the empty cells within four
//! steps along the four lines through it.

use crate::board::{Pos, Stone};

use super::patterns::{classify, combine, LineCell, Neighbours, PatternScore, Shape};

/// Reach of a single line window on each side of a cell
const REACH: isize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Square {
    Empty,
    Black,
    White,
    Wall,
}

impl Square {
    #[inline]
    fn from_stone(stone: Stone) -> Self {
        match stone {
            Stone::Black => Square::Black,
            Stone::White => Square::White,
            Stone::Empty => Square::Empty,
        }
    }

    /// How this square looks to `player` (0 = Black, 1 = White)
    #[inline]
    fn as_line_cell(self, player: usize) -> LineCell {
        match (self, player) {
            (Square::Empty, _) => LineCell::Empty,
            (Square::Black, 0) | (Square::White, 1) => LineCell::Own,
            _ => LineCell::Blocked,
        }
    }
}

/// Pattern evaluator with per-cell shape and score caches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluator {
    size: usize,
    stride: usize,
    grid: Vec<Square>,
    /// Padded-index step for each of the four directions
    steps: [isize; 4],
    /// `shapes[player][padded index][direction]`
    shapes: [Vec<[Shape; 4]>; 2],
    /// Combined (possibly composite) shape per player and cell
    points: [Vec<Shape>; 2],
    /// Point score per player and cell; zero on occupied cells
    scores: [Vec<i32>; 2],
    /// Sum of `scores` per player
    totals: [i64; 2],
    /// Empty cells where each player would complete five
    fives: [u32; 2],
    stones: usize,
}

impl Evaluator {
    /// Evaluator for an empty `size`x`size` board.
    #[must_use]
    pub fn new(size: usize) -> Self {
        let stride = size + 2;
        let cells = stride * stride;
        let mut grid = vec![Square::Empty; cells];
        for (idx, square) in grid.iter_mut().enumerate() {
            let (r, c) = (idx / stride, idx % stride);
            if r == 0 || c == 0 || r == stride - 1 || c == stride - 1 {
                *square = Square::Wall;
            }
        }

        let stride_i = stride as isize;
        let mut evaluator = Self {
            size,
            stride,
            grid,
            steps: [1, stride_i, stride_i + 1, stride_i - 1],
            shapes: [vec![[Shape::None; 4]; cells], vec![[Shape::None; 4]; cells]],
            points: [vec![Shape::None; cells], vec![Shape::None; cells]],
            scores: [vec![0; cells], vec![0; cells]],
            totals: [0, 0],
            fives: [0, 0],
            stones: 0,
        };
        evaluator.rebuild();
        evaluator
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of stones currently on the grid
    #[inline]
    pub fn stone_count(&self) -> usize {
        self.stones
    }

    #[inline]
    fn padded(&self, pos: Pos) -> usize {
        (pos.row as usize + 1) * self.stride + pos.col as usize + 1
    }

    #[inline]
    fn unpadded(&self, idx: usize) -> Pos {
        Pos::new((idx / self.stride - 1) as u8, (idx % self.stride - 1) as u8)
    }

    #[inline]
    fn step(idx: usize, delta: isize) -> usize {
        (idx as isize + delta) as usize
    }

    /// Record a stone and refresh the cells whose lines pass through it.
    pub fn move_stone(&mut self, pos: Pos, stone: Stone) {
        if !stone.is_player() {
            return;
        }
        let idx = self.padded(pos);
        self.grid[idx] = Square::from_stone(stone);
        self.stones += 1;
        self.clear_point(idx);
        self.refresh_around(idx);
    }

    /// Clear a stone and refresh the cells whose lines pass through it.
    pub fn undo_stone(&mut self, pos: Pos) {
        let idx = self.padded(pos);
        if self.grid[idx] == Square::Empty {
            return;
        }
        self.grid[idx] = Square::Empty;
        self.stones -= 1;
        for dir in 0..4 {
            self.refresh_direction(idx, dir);
        }
        self.refresh_point(idx);
        self.refresh_around(idx);
    }

    /// Place a stone without touching the caches. Callers must `rebuild`.
    pub(crate) fn set_raw(&mut self, pos: Pos, stone: Stone) {
        let idx = self.padded(pos);
        let was_stone = matches!(self.grid[idx], Square::Black | Square::White);
        self.grid[idx] = Square::from_stone(stone);
        match (was_stone, stone.is_player()) {
            (false, true) => self.stones += 1,
            (true, false) => self.stones -= 1,
            _ => {}
        }
    }

    /// Recompute every cache from the grid. O(N²).
    pub fn rebuild(&mut self) {
        self.totals = [0, 0];
        self.fives = [0, 0];
        for player in 0..2 {
            self.points[player].fill(Shape::None);
        }
        for idx in 0..self.grid.len() {
            match self.grid[idx] {
                Square::Empty => {
                    for dir in 0..4 {
                        self.refresh_direction(idx, dir);
                    }
                    self.scores[0][idx] = 0;
                    self.scores[1][idx] = 0;
                    self.refresh_point(idx);
                }
                _ => {
                    self.shapes[0][idx] = [Shape::None; 4];
                    self.shapes[1][idx] = [Shape::None; 4];
                    self.points[0][idx] = Shape::None;
                    self.points[1][idx] = Shape::None;
                    self.scores[0][idx] = 0;
                    self.scores[1][idx] = 0;
                }
            }
        }
    }

    fn refresh_around(&mut self, idx: usize) {
        for dir in 0..4 {
            let step = self.steps[dir];
            for sign in [-1isize, 1] {
                for k in 1..=REACH {
                    let j = Self::step(idx, sign * k * step);
                    match self.grid[j] {
                        Square::Wall => break,
                        Square::Empty => {
                            self.refresh_direction(j, dir);
                            self.refresh_point(j);
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    fn neighbours(&self, idx: usize, player: usize, dir: usize) -> Neighbours {
        let step = self.steps[dir];
        let mut out = [LineCell::Blocked; 8];
        for (sign, slot_of) in [(-1isize, 4isize), (1, 3)] {
            for k in 1..=REACH {
                let j = Self::step(idx, sign * k * step);
                let square = self.grid[j];
                if square == Square::Wall {
                    break;
                }
                // offsets -4..-1 land in slots 0..3, +1..+4 in slots 4..7
                let slot = (slot_of + sign * k) as usize;
                out[slot] = square.as_line_cell(player);
            }
        }
        out
    }

    fn refresh_direction(&mut self, idx: usize, dir: usize) {
        for player in 0..2 {
            self.shapes[player][idx][dir] = classify(&self.neighbours(idx, player, dir));
        }
    }

    fn refresh_point(&mut self, idx: usize) {
        for player in 0..2 {
            let (shape, score) = combine(&self.shapes[player][idx]);
            self.count_five(player, self.points[player][idx], shape);
            self.totals[player] += i64::from(score - self.scores[player][idx]);
            self.scores[player][idx] = score;
            self.points[player][idx] = shape;
        }
    }

    #[inline]
    fn count_five(&mut self, player: usize, old: Shape, new: Shape) {
        if old == Shape::Five {
            self.fives[player] -= 1;
        }
        if new == Shape::Five {
            self.fives[player] += 1;
        }
    }

    fn clear_point(&mut self, idx: usize) {
        for player in 0..2 {
            self.count_five(player, self.points[player][idx], Shape::None);
            self.totals[player] -= i64::from(self.scores[player][idx]);
            self.scores[player][idx] = 0;
            self.points[player][idx] = Shape::None;
            self.shapes[player][idx] = [Shape::None; 4];
        }
    }

    /// Static evaluation: own point scores minus the opponent's, summed over
    /// every empty cell and clamped to `PatternScore::EVAL_LIMIT`.
    #[must_use]
    pub fn evaluate(&self, perspective: Stone) -> i32 {
        let Some(me) = perspective.player_index() else {
            return 0;
        };
        let diff = self.totals[me] - self.totals[1 - me];
        let limit = i64::from(PatternScore::EVAL_LIMIT);
        diff.clamp(-limit, limit) as i32
    }

    /// Combined shape `stone` would make by playing at `pos`.
    #[inline]
    pub fn shape(&self, pos: Pos, stone: Stone) -> Shape {
        match stone.player_index() {
            Some(p) => self.points[p][self.padded(pos)],
            None => Shape::None,
        }
    }

    /// Shape along one direction (index into [`DIRECTIONS`](crate::board::DIRECTIONS)).
    #[inline]
    pub fn direction_shape(&self, pos: Pos, stone: Stone, dir: usize) -> Shape {
        match stone.player_index() {
            Some(p) => self.shapes[p][self.padded(pos)][dir],
            None => Shape::None,
        }
    }

    /// Cached point score for `stone` at `pos` (zero once occupied).
    #[inline]
    pub fn score(&self, pos: Pos, stone: Stone) -> i32 {
        match stone.player_index() {
            Some(p) => self.scores[p][self.padded(pos)],
            None => 0,
        }
    }

    /// Number of empty cells where `stone` would complete five.
    #[inline]
    pub fn five_points(&self, stone: Stone) -> u32 {
        stone.player_index().map_or(0, |p| self.fives[p])
    }

    /// Sum of all point scores for one player.
    #[inline]
    pub fn total(&self, stone: Stone) -> i64 {
        stone.player_index().map_or(0, |p| self.totals[p])
    }

    /// Empty cells in row-major order.
    pub(crate) fn empty_cells(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.grid.len())
            .filter(move |&idx| self.grid[idx] == Square::Empty)
            .map(move |idx| self.unpadded(idx))
    }

    /// Caches for one empty cell: (point shape, point score) per player.
    #[inline]
    pub(crate) fn cell_info(&self, pos: Pos) -> [(Shape, i32); 2] {
        let idx = self.padded(pos);
        [
            (self.points[0][idx], self.scores[0][idx]),
            (self.points[1][idx], self.scores[1][idx]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_stones(size: usize, stones: &[(u8, u8, Stone)]) -> Evaluator {
        let mut ev = Evaluator::new(size);
        for &(r, c, s) in stones {
            ev.move_stone(Pos::new(r, c), s);
        }
        ev
    }

    /// Caches must match a from-scratch rebuild
    fn assert_matches_rebuild(ev: &Evaluator) {
        let mut fresh = ev.clone();
        fresh.rebuild();
        assert_eq!(ev.totals, fresh.totals);
        assert_eq!(ev.fives, fresh.fives);
        assert_eq!(ev.scores, fresh.scores);
        assert_eq!(ev.points, fresh.points);
        assert_eq!(ev.shapes, fresh.shapes);
    }

    #[test]
    fn test_empty_board_scores_zero() {
        let ev = Evaluator::new(15);
        assert_eq!(ev.total(Stone::Black), 0);
        assert_eq!(ev.total(Stone::White), 0);
        assert_eq!(ev.evaluate(Stone::Black), 0);
    }

    #[test]
    fn test_open_four_literal() {
        // _XXX[?]_ on row 7: playing (7, 6) makes _XXXX_
        let ev = with_stones(
            15,
            &[(7, 3, Stone::Black), (7, 4, Stone::Black), (7, 5, Stone::Black)],
        );
        assert_eq!(ev.direction_shape(Pos::new(7, 6), Stone::Black, 0), Shape::Four);
        assert_eq!(ev.direction_shape(Pos::new(7, 2), Stone::Black, 0), Shape::Four);
    }

    #[test]
    fn test_blocked_four_literal() {
        // OXXX[?]_
        let ev = with_stones(
            15,
            &[
                (7, 2, Stone::White),
                (7, 3, Stone::Black),
                (7, 4, Stone::Black),
                (7, 5, Stone::Black),
            ],
        );
        assert_eq!(
            ev.direction_shape(Pos::new(7, 6), Stone::Black, 0),
            Shape::BlockedFour
        );
    }

    #[test]
    fn test_wall_blocks_like_opponent() {
        // |XXX[?]_ against the left edge
        let ev = with_stones(
            15,
            &[(7, 0, Stone::Black), (7, 1, Stone::Black), (7, 2, Stone::Black)],
        );
        assert_eq!(
            ev.direction_shape(Pos::new(7, 3), Stone::Black, 0),
            Shape::BlockedFour
        );
    }

    #[test]
    fn test_five_regardless_of_ends() {
        let ev = with_stones(
            15,
            &[
                (7, 1, Stone::White),
                (7, 2, Stone::Black),
                (7, 3, Stone::Black),
                (7, 4, Stone::Black),
                (7, 5, Stone::Black),
                (7, 7, Stone::White),
            ],
        );
        assert_eq!(ev.shape(Pos::new(7, 6), Stone::Black), Shape::Five);
        assert_eq!(ev.five_points(Stone::Black), 1);
        assert_eq!(ev.five_points(Stone::White), 0);
        assert!(ev.score(Pos::new(7, 6), Stone::Black) >= PatternScore::FIVE);
    }

    #[test]
    fn test_diagonal_directions() {
        let ev = with_stones(
            15,
            &[(3, 3, Stone::Black), (4, 4, Stone::Black), (5, 5, Stone::Black)],
        );
        assert_eq!(ev.direction_shape(Pos::new(6, 6), Stone::Black, 2), Shape::Four);

        let ev = with_stones(
            15,
            &[(3, 9, Stone::Black), (4, 8, Stone::Black), (5, 7, Stone::Black)],
        );
        assert_eq!(ev.direction_shape(Pos::new(6, 6), Stone::Black, 3), Shape::Four);
    }

    #[test]
    fn test_evaluate_is_clamped_below_win_scores() {
        // Two open fours: four cells complete five, each worth FIVE
        let ev = with_stones(
            15,
            &[
                (3, 3, Stone::Black),
                (3, 4, Stone::Black),
                (3, 5, Stone::Black),
                (3, 6, Stone::Black),
                (9, 3, Stone::Black),
                (9, 4, Stone::Black),
                (9, 5, Stone::Black),
                (9, 6, Stone::Black),
            ],
        );
        assert_eq!(ev.five_points(Stone::Black), 4);
        assert_eq!(ev.evaluate(Stone::Black), PatternScore::EVAL_LIMIT);
        assert_eq!(ev.evaluate(Stone::White), -PatternScore::EVAL_LIMIT);
    }

    #[test]
    fn test_occupied_cell_scores_zero() {
        let ev = with_stones(15, &[(7, 7, Stone::Black), (7, 8, Stone::Black)]);
        assert_eq!(ev.score(Pos::new(7, 7), Stone::Black), 0);
        assert_eq!(ev.score(Pos::new(7, 7), Stone::White), 0);
        assert_eq!(ev.shape(Pos::new(7, 8), Stone::Black), Shape::None);
    }

    #[test]
    fn test_evaluate_is_antisymmetric() {
        let ev = with_stones(
            15,
            &[(7, 7, Stone::Black), (7, 8, Stone::Black), (8, 8, Stone::White)],
        );
        assert_eq!(ev.evaluate(Stone::Black), -ev.evaluate(Stone::White));
        assert!(ev.evaluate(Stone::Black) > 0);
    }

    #[test]
    fn test_composite_at_cell() {
        // Row three and column three meeting at (7, 7)
        let ev = with_stones(
            15,
            &[
                (7, 5, Stone::Black),
                (7, 6, Stone::Black),
                (5, 7, Stone::Black),
                (6, 7, Stone::Black),
            ],
        );
        assert_eq!(ev.shape(Pos::new(7, 7), Stone::Black), Shape::ThreeThree);
        assert_eq!(ev.score(Pos::new(7, 7), Stone::Black), PatternScore::THREE_THREE);
    }

    #[test]
    fn test_incremental_matches_rebuild() {
        let mut ev = with_stones(
            15,
            &[
                (7, 7, Stone::Black),
                (7, 8, Stone::White),
                (8, 8, Stone::Black),
                (6, 6, Stone::White),
                (9, 9, Stone::Black),
                (0, 0, Stone::White),
                (14, 13, Stone::Black),
            ],
        );
        assert_matches_rebuild(&ev);

        ev.undo_stone(Pos::new(9, 9));
        ev.undo_stone(Pos::new(0, 0));
        assert_matches_rebuild(&ev);
    }

    #[test]
    fn test_move_then_undo_restores_caches() {
        let base = with_stones(15, &[(7, 7, Stone::Black), (7, 8, Stone::White)]);
        let mut ev = base.clone();
        ev.move_stone(Pos::new(8, 7), Stone::Black);
        ev.undo_stone(Pos::new(8, 7));

        assert_eq!(ev.totals, base.totals);
        assert_eq!(ev.scores, base.scores);
        assert_eq!(ev.shapes, base.shapes);
        assert_eq!(ev.stone_count(), 2);
    }

    #[test]
    fn test_empty_cells_iterates_unpadded() {
        let ev = with_stones(5, &[(0, 0, Stone::Black), (4, 4, Stone::White)]);
        let cells: Vec<Pos> = ev.empty_cells().collect();
        assert_eq!(cells.len(), 23);
        assert_eq!(cells[0], Pos::new(0, 1));
        assert!(!cells.contains(&Pos::new(4, 4)));
    }
}
