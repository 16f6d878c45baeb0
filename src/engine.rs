//! Main AI Engine integrating all search components
//!
//! The engine answers "what should `side` play here?" in two steps:
//!
//! 1. **Opening book**: a known early position is answered without searching
//! 2. **Alpha-Beta**: iterative deepening within the difficulty's depth and
//!    time budget, then the difficulty picks from the ranked root moves
//!
//! # Example
//!
//! ```
//! use gomoku_ai::{AIEngine, Board, EngineConfig, Pos, Stone};
//!
//! let config = EngineConfig { level: 1, seed: Some(7), ..EngineConfig::default() };
//! let mut engine = AIEngine::new(config).unwrap();
//!
//! let mut board = Board::new(15).unwrap();
//! board.put(Pos::new(7, 7), Stone::Black).unwrap();
//!
//! let result = engine.get_move_with_stats(&board, Stone::White).unwrap();
//! println!("Best move: {:?}", result.best_move);
//! println!("Source: {:?}", result.source);
//! println!("Time: {}ms", result.time_ms);
//! ```

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::board::{Board, Pos, Stone, DEFAULT_SIZE};
use crate::book::OpeningBook;
use crate::config::EngineConfig;
use crate::difficulty::{Difficulty, DifficultySettings};
use crate::error::EngineError;
use crate::search::{SearchResult, Searcher, TTStats};

/// Where the returned move came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    /// Known reply from the opening book
    OpeningBook,
    /// Alpha-beta search, possibly randomized by the difficulty level
    Search,
    /// The board is full
    NoLegalMove,
}

/// Result of a move search with detailed statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    /// Move to play, `None` only when there is no legal move
    pub best_move: Option<Pos>,
    /// Search score of the chosen move from the mover's point of view
    pub score: i32,
    pub source: MoveSource,
    /// Deepest completed iteration (0 for book moves)
    pub depth: i32,
    /// Number of nodes searched
    pub nodes: u64,
    /// Time taken in milliseconds
    pub time_ms: u64,
}

impl MoveResult {
    #[inline]
    fn book(pos: Pos, time_ms: u64) -> Self {
        Self {
            best_move: Some(pos),
            score: 0,
            source: MoveSource::OpeningBook,
            depth: 0,
            nodes: 0,
            time_ms,
        }
    }

    /// Result for `chosen`, which must be one of `result`'s ranked moves.
    #[inline]
    fn from_search(result: &SearchResult, chosen: Option<Pos>, time_ms: u64) -> Self {
        let score = chosen
            .and_then(|pos| result.ranked.iter().find(|m| m.pos == pos))
            .map_or(result.score, |m| m.score);
        Self {
            best_move: chosen,
            score,
            source: if chosen.is_some() {
                MoveSource::Search
            } else {
                MoveSource::NoLegalMove
            },
            depth: result.depth,
            nodes: result.nodes,
            time_ms,
        }
    }

    #[inline]
    fn no_move(time_ms: u64) -> Self {
        Self {
            best_move: None,
            score: 0,
            source: MoveSource::NoLegalMove,
            depth: 0,
            nodes: 0,
            time_ms,
        }
    }
}

/// Computer opponent: opening book, searcher and difficulty in one place.
///
/// Tables learned during a game (transposition, killers, history) persist
/// between calls until [`AIEngine::new_game`].
#[derive(Debug)]
pub struct AIEngine {
    config: EngineConfig,
    difficulty: Difficulty,
    settings: DifficultySettings,
    searcher: Searcher,
    /// Built lazily for the size of the board being played
    book: Option<OpeningBook>,
    rng: StdRng,
}

impl AIEngine {
    /// Build an engine from a validated configuration.
    ///
    /// # Errors
    /// [`EngineError::Config`] if any setting is out of range.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let difficulty = config.validate()?;
        let settings = config.difficulty_settings()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        info!(%difficulty, book = config.use_opening_book, "engine ready");

        Ok(Self {
            searcher: Searcher::new(DEFAULT_SIZE, config.search_options()),
            config,
            difficulty,
            settings,
            book: None,
            rng,
        })
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[inline]
    pub fn settings(&self) -> &DifficultySettings {
        &self.settings
    }

    /// Switch level mid-game. Learned tables are kept.
    ///
    /// # Errors
    /// [`EngineError::Config`] for an unknown level; the engine is unchanged.
    pub fn set_difficulty(&mut self, level: u8) -> Result<(), EngineError> {
        let config = EngineConfig {
            level,
            ..self.config.clone()
        };
        self.settings = config.difficulty_settings()?;
        self.difficulty = config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Forget everything learned in previous games.
    pub fn new_game(&mut self) {
        self.searcher.new_game();
    }

    #[must_use]
    pub fn tt_stats(&self) -> TTStats {
        self.searcher.tt_stats()
    }

    /// Best move for `side`, or `None` on a full board.
    ///
    /// # Errors
    /// See [`AIEngine::get_move_with_stats`].
    pub fn get_move(&mut self, board: &Board, side: Stone) -> Result<Option<Pos>, EngineError> {
        Ok(self.get_move_with_stats(board, side)?.best_move)
    }

    /// Choose a move for `side` and report how it was found.
    ///
    /// `board` is never modified.
    ///
    /// # Errors
    /// [`EngineError::InvalidSide`] when `side` is [`Stone::Empty`].
    pub fn get_move_with_stats(&mut self, board: &Board, side: Stone) -> Result<MoveResult, EngineError> {
        let start = Instant::now();
        if !side.is_player() {
            return Err(EngineError::InvalidSide(side));
        }
        if board.is_full() {
            debug!("board full, no legal move");
            return Ok(MoveResult::no_move(elapsed_ms(start)));
        }

        if let Some(pos) = self.book_move(board, side) {
            info!(%pos, ?side, "opening book move");
            return Ok(MoveResult::book(pos, elapsed_ms(start)));
        }

        let result = self.searcher.search(
            board,
            side,
            self.settings.max_depth,
            Some(self.settings.time_budget),
        );
        let chosen = self.settings.select(&result.ranked, &mut self.rng);
        let move_result = MoveResult::from_search(&result, chosen, elapsed_ms(start));

        info!(
            pos = ?move_result.best_move,
            score = move_result.score,
            depth = move_result.depth,
            nodes = move_result.nodes,
            time_ms = move_result.time_ms,
            randomized = chosen != result.best_move,
            "search move"
        );
        Ok(move_result)
    }

    fn book_move(&mut self, board: &Board, side: Stone) -> Option<Pos> {
        if !self.config.use_opening_book {
            return None;
        }
        let size = board.size();
        if self.book.as_ref().map(OpeningBook::size) != Some(size) {
            self.book = Some(OpeningBook::standard(size));
        }
        self.book.as_ref().and_then(|book| book.probe(board, side))
    }
}

#[inline]
fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    fn engine(level: u8, book: bool) -> AIEngine {
        AIEngine::new(EngineConfig {
            level,
            use_opening_book: book,
            time_budget_ms: Some(2_000),
            seed: Some(1),
            ..EngineConfig::default()
        })
        .unwrap()
    }

    fn board_with(stones: &[(u8, u8, Stone)]) -> Board {
        let mut board = Board::new(15).unwrap();
        for &(r, c, s) in stones {
            board.put(Pos::new(r, c), s).unwrap();
        }
        board
    }

    #[test]
    fn test_engine_rejects_bad_config() {
        let err = AIEngine::new(EngineConfig {
            level: 0,
            ..EngineConfig::default()
        })
        .unwrap_err();
        assert_eq!(err, EngineError::Config(ConfigError::UnknownLevel(0)));
    }

    #[test]
    fn test_engine_empty_board_uses_book() {
        let mut engine = engine(3, true);
        let board = Board::new(15).unwrap();
        let result = engine.get_move_with_stats(&board, Stone::Black).unwrap();

        assert_eq!(result.best_move, Some(Pos::new(7, 7)));
        assert_eq!(result.source, MoveSource::OpeningBook);
        assert_eq!(result.nodes, 0);
    }

    #[test]
    fn test_engine_book_ignores_out_of_turn_request() {
        let mut engine = engine(3, true);
        let board = Board::new(15).unwrap();
        let result = engine.get_move_with_stats(&board, Stone::White).unwrap();

        assert_eq!(result.source, MoveSource::Search);
        assert!(result.nodes > 0);
    }

    #[test]
    fn test_engine_book_follows_board_size() {
        let mut engine = engine(3, true);
        let board = Board::new(9).unwrap();
        let result = engine.get_move_with_stats(&board, Stone::Black).unwrap();
        assert_eq!(result.best_move, Some(Pos::new(4, 4)));
        assert_eq!(result.source, MoveSource::OpeningBook);
    }

    #[test]
    fn test_engine_without_book_searches() {
        let mut engine = engine(1, false);
        let board = Board::new(15).unwrap();
        let result = engine.get_move_with_stats(&board, Stone::Black).unwrap();

        assert_eq!(result.source, MoveSource::Search);
        assert_eq!(result.best_move, Some(Pos::new(7, 7)));
        assert!(result.nodes > 0);
    }

    #[test]
    fn test_engine_finds_immediate_win() {
        let board = board_with(&[
            (7, 3, Stone::Black),
            (7, 4, Stone::Black),
            (7, 5, Stone::Black),
            (7, 6, Stone::Black),
            (0, 0, Stone::White),
            (0, 2, Stone::White),
            (0, 4, Stone::White),
            (14, 14, Stone::White),
        ]);
        let mut engine = engine(5, true);
        let result = engine.get_move_with_stats(&board, Stone::Black).unwrap();

        let pos = result.best_move.unwrap();
        assert!(pos == Pos::new(7, 2) || pos == Pos::new(7, 7));
        assert!(result.score > 0);
    }

    #[test]
    fn test_engine_blocks_opponent_win() {
        let board = board_with(&[
            (7, 3, Stone::White),
            (7, 4, Stone::White),
            (7, 5, Stone::White),
            (7, 6, Stone::White),
            (7, 2, Stone::Black),
            (10, 10, Stone::Black),
            (12, 3, Stone::Black),
        ]);
        let mut engine = engine(5, true);
        let result = engine.get_move_with_stats(&board, Stone::Black).unwrap();

        assert_eq!(result.best_move, Some(Pos::new(7, 7)));
        assert_eq!(result.source, MoveSource::Search);
    }

    #[test]
    fn test_engine_full_board_has_no_move() {
        let rows: Vec<Vec<Stone>> = ["BBWWB", "WWBBW", "BBWWB", "WWBBW", "BBWWB"]
            .iter()
            .map(|row| {
                row.chars()
                    .map(|ch| if ch == 'B' { Stone::Black } else { Stone::White })
                    .collect()
            })
            .collect();
        let board = Board::from_rows(&rows).unwrap();

        let mut engine = engine(3, true);
        let result = engine.get_move_with_stats(&board, Stone::White).unwrap();
        assert_eq!(result.best_move, None);
        assert_eq!(result.source, MoveSource::NoLegalMove);
    }

    #[test]
    fn test_engine_rejects_empty_side() {
        let mut engine = engine(3, true);
        let board = Board::new(15).unwrap();
        assert_eq!(
            engine.get_move(&board, Stone::Empty),
            Err(EngineError::InvalidSide(Stone::Empty))
        );
    }

    #[test]
    fn test_engine_does_not_modify_board() {
        let board = board_with(&[(7, 7, Stone::Black), (8, 8, Stone::White)]);
        let before = board.clone();
        let mut engine = engine(2, false);
        engine.get_move(&board, Stone::Black).unwrap();

        assert_eq!(board.cells(), before.cells());
        assert_eq!(board.hash(), before.hash());
        assert_eq!(board.stone_count(), before.stone_count());
    }

    #[test]
    fn test_engine_expert_matches_search_best() {
        let board = board_with(&[(7, 7, Stone::Black), (8, 8, Stone::White), (6, 8, Stone::Black)]);
        let mut engine = AIEngine::new(EngineConfig {
            level: 5,
            use_opening_book: false,
            time_budget_ms: Some(50),
            seed: Some(3),
            ..EngineConfig::default()
        })
        .unwrap();
        let result = engine.get_move_with_stats(&board, Stone::White).unwrap();

        // Expert never randomizes, so the move is the top of the ranking
        let mut searcher = Searcher::new(15, engine.config().search_options());
        let reference = searcher.search(&board, Stone::White, result.depth, None);
        assert_eq!(result.best_move, reference.best_move);
    }

    #[test]
    fn test_engine_set_difficulty() {
        let mut engine = engine(3, true);
        engine.set_difficulty(5).unwrap();
        assert_eq!(engine.difficulty(), Difficulty::Expert);
        assert_eq!(engine.settings().random_chance, 0.0);

        assert!(engine.set_difficulty(6).is_err());
        assert_eq!(engine.difficulty(), Difficulty::Expert);
    }

    #[test]
    fn test_engine_new_game_clears_tables() {
        let board = board_with(&[(7, 7, Stone::Black), (8, 8, Stone::White)]);
        let mut engine = engine(2, false);
        engine.get_move(&board, Stone::Black).unwrap();
        assert!(engine.tt_stats().entries > 0);

        engine.new_game();
        assert_eq!(engine.tt_stats().entries, 0);
    }
}
