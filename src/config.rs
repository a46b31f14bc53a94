use std::path::Path;

use tracing::warn;

use crate::constants::{
    BOARD_HEIGHT, BOARD_WIDTH, MATCH_BASE_POINTS, MAX_BOARD_CELLS, MIN_BOARD_SIDE, MIN_GEM_KINDS,
    NUM_GEM_KINDS, POINTS_PER_EXTRA_GEM, SCORE_DECAY_MS,
};
use crate::error::ConfigError;

/// Board and scoring settings for a session, loadable from TOML.
///
/// Missing keys take their defaults:
///
/// ```toml
/// width = 8
/// height = 8
/// gem_kinds = 7
/// match_base_points = 10
/// points_per_extra_gem = 10
/// score_decay_ms = 800   # 0 turns decay off
/// seed = 42              # omit for a random game
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub gem_kinds: u8,
    pub match_base_points: u32,
    pub points_per_extra_gem: u32,
    pub score_decay_ms: u64,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            gem_kinds: NUM_GEM_KINDS,
            match_base_points: MATCH_BASE_POINTS,
            points_per_extra_gem: POINTS_PER_EXTRA_GEM,
            score_decay_ms: SCORE_DECAY_MS,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: GameConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_BOARD_SIDE || self.height < MIN_BOARD_SIDE {
            return Err(ConfigError::Invalid(format!(
                "board must be at least {MIN_BOARD_SIDE}x{MIN_BOARD_SIDE} (got {}x{})",
                self.width, self.height
            )));
        }
        if self.width.saturating_mul(self.height) > MAX_BOARD_CELLS {
            return Err(ConfigError::Invalid(format!(
                "board must have at most {MAX_BOARD_CELLS} cells"
            )));
        }
        if self.gem_kinds < MIN_GEM_KINDS {
            return Err(ConfigError::Invalid(format!(
                "gem_kinds must be >= {MIN_GEM_KINDS}"
            )));
        }
        if self.match_base_points == 0 {
            return Err(ConfigError::Invalid(
                "match_base_points must be > 0".into(),
            ));
        }
        Ok(())
    }
}
