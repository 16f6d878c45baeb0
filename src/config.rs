//! Engine configuration
//!
//! Everything an [`AIEngine`](crate::engine::AIEngine) can be tuned with,
//! loadable from JSON. Missing fields take their defaults.
//!
//! ```
//! use gomoku_ai::config::EngineConfig;
//!
//! let config = EngineConfig::from_json(r#"{ "level": 5, "seed": 42 }"#).unwrap();
//! assert_eq!(config.level, 5);
//! assert!(config.use_opening_book);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::difficulty::{Difficulty, DifficultySettings};
use crate::error::ConfigError;
use crate::eval::DEFAULT_CANDIDATE_CAP;
use crate::search::alphabeta::{DEFAULT_QUIESCENCE_DEPTH, MAX_QUIESCENCE_DEPTH};
use crate::search::SearchOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Difficulty level, 1..=5
    pub level: u8,
    pub use_opening_book: bool,
    /// Candidate moves considered per node
    pub candidate_cap: usize,
    /// Overrides the level's time budget
    pub time_budget_ms: Option<u64>,
    pub use_transposition_table: bool,
    /// Flush threshold for the transposition table; unbounded when `None`
    pub tt_capacity: Option<usize>,
    pub quiescence_depth: u8,
    /// Seed for move randomization; entropy when `None`
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            level: Difficulty::default().level(),
            use_opening_book: true,
            candidate_cap: DEFAULT_CANDIDATE_CAP,
            time_budget_ms: None,
            use_transposition_table: true,
            tt_capacity: None,
            quiescence_depth: DEFAULT_QUIESCENCE_DEPTH,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document.
    ///
    /// # Errors
    /// [`ConfigError::Parse`] for malformed JSON. The result is not validated.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize as pretty-printed JSON.
    ///
    /// # Errors
    /// Propagates serializer failures as [`ConfigError::Parse`].
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check every field and resolve the difficulty level.
    ///
    /// # Errors
    /// The first invalid field found.
    pub fn validate(&self) -> Result<Difficulty, ConfigError> {
        let difficulty = Difficulty::try_from(self.level)?;
        if self.candidate_cap == 0 {
            return Err(ConfigError::InvalidCandidateCap(self.candidate_cap));
        }
        if self.quiescence_depth > MAX_QUIESCENCE_DEPTH {
            return Err(ConfigError::InvalidQuiescenceDepth {
                depth: self.quiescence_depth,
                max: MAX_QUIESCENCE_DEPTH,
            });
        }
        Ok(difficulty)
    }

    /// Settings for the configured level with the time override applied.
    ///
    /// # Errors
    /// Same as [`EngineConfig::validate`].
    pub fn difficulty_settings(&self) -> Result<DifficultySettings, ConfigError> {
        let mut settings = self.validate()?.settings();
        if let Some(ms) = self.time_budget_ms {
            settings.time_budget = Duration::from_millis(ms);
        }
        settings.validate()?;
        Ok(settings)
    }

    #[must_use]
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            candidate_cap: self.candidate_cap,
            use_tt: self.use_transposition_table,
            quiescence_depth: self.quiescence_depth,
            tt_capacity: self.tt_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.validate(), Ok(Difficulty::Medium));
        assert_eq!(config.search_options(), SearchOptions::default());
    }

    #[test]
    fn test_rejects_bad_fields() {
        let config = EngineConfig {
            level: 9,
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::UnknownLevel(9)));

        let config = EngineConfig {
            candidate_cap: 0,
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidCandidateCap(0)));

        let config = EngineConfig {
            quiescence_depth: MAX_QUIESCENCE_DEPTH + 1,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidQuiescenceDepth { .. })
        ));
    }

    #[test]
    fn test_time_override() {
        let config = EngineConfig {
            level: 1,
            time_budget_ms: Some(50),
            ..EngineConfig::default()
        };
        let settings = config.difficulty_settings().unwrap();
        assert_eq!(settings.time_budget, Duration::from_millis(50));
        assert_eq!(settings.max_depth, Difficulty::Beginner.settings().max_depth);
    }

    #[test]
    fn test_json_partial_document() {
        let config = EngineConfig::from_json(r#"{ "level": 2, "use_opening_book": false }"#).unwrap();
        assert_eq!(config.level, 2);
        assert!(!config.use_opening_book);
        assert_eq!(config.candidate_cap, DEFAULT_CANDIDATE_CAP);
    }

    #[test]
    fn test_json_round_trip() {
        let config = EngineConfig {
            level: 4,
            seed: Some(99),
            tt_capacity: Some(1 << 16),
            ..EngineConfig::default()
        };
        let text = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&text).unwrap(), config);
    }

    #[test]
    fn test_json_malformed() {
        assert!(matches!(
            EngineConfig::from_json("{ level: }"),
            Err(ConfigError::Parse(_))
        ));
    }
}
