//! Game configuration.
//!
//! The only configuration surface is the grid size and the size of the tile
//! kind alphabet, plus a seed for reproducible boards. All are fixed when a
//! game is built.

use serde::{Deserialize, Serialize};

use crate::board::{MAX_KINDS, MIN_KINDS};

/// Default board height and width.
pub const DEFAULT_SIZE: usize = 9;

/// Default number of tile kinds.
pub const DEFAULT_KINDS: u8 = 6;

/// Largest accepted board height or width.
pub const MAX_SIZE: usize = 64;

/// Errors raised when validating a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("board needs at least one row and one column, got {rows}x{cols}")]
    EmptyBoard { rows: usize, cols: usize },

    #[error("board of {rows}x{cols} exceeds the {max}x{max} limit")]
    TooLarge { rows: usize, cols: usize, max: usize },

    #[error("kind count must be between {min} and {max}, got {got}")]
    KindsOutOfRange { got: u8, min: u8, max: u8 },

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("invalid value '{value}' for option '{name}'")]
    InvalidValue { name: String, value: String },
}

/// Parameters of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    pub kinds: u8,
    /// Seed for tile generation; 0 draws from entropy.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            rows: DEFAULT_SIZE,
            cols: DEFAULT_SIZE,
            kinds: DEFAULT_KINDS,
            seed: 0,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::EmptyBoard {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.rows > MAX_SIZE || self.cols > MAX_SIZE {
            return Err(ConfigError::TooLarge {
                rows: self.rows,
                cols: self.cols,
                max: MAX_SIZE,
            });
        }
        if !(MIN_KINDS..=MAX_KINDS).contains(&self.kinds) {
            return Err(ConfigError::KindsOutOfRange {
                got: self.kinds,
                min: MIN_KINDS,
                max: MAX_KINDS,
            });
        }
        Ok(())
    }

    /// Applies a named option (`Rows`, `Cols`, `Kinds`, `Seed`; case-insensitive).
    /// The value is range-checked later by [`validate`](Self::validate).
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        };
        match name.to_ascii_lowercase().as_str() {
            "rows" => self.rows = value.parse().map_err(|_| invalid())?,
            "cols" => self.cols = value.parse().map_err(|_| invalid())?,
            "kinds" => self.kinds = value.parse().map_err(|_| invalid())?,
            "seed" => self.seed = value.parse().map_err(|_| invalid())?,
            _ => return Err(ConfigError::UnknownOption(name.to_string())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = GameConfig::default();
        assert_eq!((config.rows, config.cols, config.kinds), (9, 9, 6));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_dimension_rejected() {
        let config = GameConfig {
            cols: 0,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyBoard { rows: 9, cols: 0 })
        );
    }

    #[test]
    fn oversized_dimensions_rejected() {
        let config = GameConfig {
            rows: usize::MAX,
            cols: 2,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooLarge {
                rows: usize::MAX,
                cols: 2,
                max: MAX_SIZE
            })
        );
        let config = GameConfig {
            rows: MAX_SIZE,
            cols: MAX_SIZE + 1,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
        let config = GameConfig {
            rows: MAX_SIZE,
            cols: MAX_SIZE,
            ..GameConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn kinds_range_enforced() {
        for kinds in [0, 1, 2, 9, 30] {
            let config = GameConfig {
                kinds,
                ..GameConfig::default()
            };
            assert!(config.validate().is_err(), "kinds {} accepted", kinds);
        }
        for kinds in MIN_KINDS..=MAX_KINDS {
            let config = GameConfig {
                kinds,
                ..GameConfig::default()
            };
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn set_known_options() {
        let mut config = GameConfig::default();
        config.set("Rows", "7").unwrap();
        config.set("cols", "5").unwrap();
        config.set("KINDS", "4").unwrap();
        config.set("Seed", "42").unwrap();
        assert_eq!(
            config,
            GameConfig {
                rows: 7,
                cols: 5,
                kinds: 4,
                seed: 42
            }
        );
    }

    #[test]
    fn set_rejects_bad_input() {
        let mut config = GameConfig::default();
        assert_eq!(
            config.set("Depth", "3"),
            Err(ConfigError::UnknownOption("Depth".into()))
        );
        assert!(matches!(
            config.set("Rows", "many"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn deserializes_from_json() {
        let config: GameConfig =
            serde_json::from_str(r#"{"rows":8,"cols":10,"kinds":5,"seed":3}"#).unwrap();
        assert_eq!(config.cols, 10);
        assert!(config.validate().is_ok());
    }
}
