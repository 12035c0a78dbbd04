use alloc::string::String;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::*;

/// Named board presets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub const fn config(self) -> GameConfig {
        let (size, mines) = match self {
            Self::Easy => ((9, 9), 10),
            Self::Medium => ((16, 16), 40),
            Self::Hard => ((16, 30), 99),
        };
        GameConfig {
            size,
            mines,
            difficulty: Some(self),
        }
    }

    /// Every preset, easiest first.
    pub const fn presets() -> [GameConfig; 3] {
        [
            Self::Easy.config(),
            Self::Medium.config(),
            Self::Hard.config(),
        ]
    }

    /// Looks up a preset by name, falling back to easy for anything unknown.
    pub fn config_or_default(name: &str) -> GameConfig {
        name.parse::<Self>().unwrap_or_default().config()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(s.trim()))
            .ok_or(GameError::UnknownDifficulty)
    }
}

/// Classic board configuration: `{rows, cols, mines, difficulty?}`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "wire::GameConfig", into = "wire::GameConfig")]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
    pub difficulty: Option<Difficulty>,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self {
            size,
            mines,
            difficulty: None,
        }
    }

    /// Builds a custom configuration, clamping each side to at least one cell.
    ///
    /// The mine count is kept as requested; boards that cannot hold that many
    /// are filled completely by the generator.
    pub fn new((rows, cols): Coord2, mines: CellCount) -> Self {
        Self::new_unchecked((rows.max(1), cols.max(1)), mines)
    }

    pub const fn rows(&self) -> Coord {
        self.size.0
    }

    pub const fn cols(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    /// Parses the JSON configuration shape and rejects empty boards.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|err| {
            log::warn!("rejected game configuration: {}", err);
            GameError::InvalidConfig
        })?;
        if config.rows() == 0 || config.cols() == 0 {
            return Err(GameError::InvalidConfig);
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|_| GameError::InvalidConfig)
    }
}

impl From<Difficulty> for GameConfig {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.config()
    }
}

/// Maze configuration: `{rows, cols, mines}` with the classic semantics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "wire::MazeConfig", into = "wire::MazeConfig")]
pub struct MazeConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl MazeConfig {
    pub fn new((rows, cols): Coord2, mines: CellCount) -> Self {
        Self {
            size: (rows.max(1), cols.max(1)),
            mines,
        }
    }

    /// Shortest Manhattan distance allowed between start and exit.
    pub const fn min_distance(&self) -> u16 {
        (self.size.0 as u16 + self.size.1 as u16) / 3
    }
}

impl From<GameConfig> for MazeConfig {
    fn from(config: GameConfig) -> Self {
        Self {
            size: config.size,
            mines: config.mines,
        }
    }
}

/// Flat JSON shapes, with `(rows, cols)` spelled out as named fields.
mod wire {
    use serde::{Deserialize, Serialize};

    use crate::{CellCount, Coord, Difficulty};

    #[derive(Serialize, Deserialize)]
    pub(super) struct GameConfig {
        rows: Coord,
        cols: Coord,
        mines: CellCount,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        difficulty: Option<Difficulty>,
    }

    impl From<GameConfig> for super::GameConfig {
        fn from(raw: GameConfig) -> Self {
            Self {
                size: (raw.rows, raw.cols),
                mines: raw.mines,
                difficulty: raw.difficulty,
            }
        }
    }

    impl From<super::GameConfig> for GameConfig {
        fn from(config: super::GameConfig) -> Self {
            Self {
                rows: config.size.0,
                cols: config.size.1,
                mines: config.mines,
                difficulty: config.difficulty,
            }
        }
    }

    #[derive(Serialize, Deserialize)]
    pub(super) struct MazeConfig {
        rows: Coord,
        cols: Coord,
        mines: CellCount,
    }

    impl From<MazeConfig> for super::MazeConfig {
        fn from(raw: MazeConfig) -> Self {
            Self {
                size: (raw.rows, raw.cols),
                mines: raw.mines,
            }
        }
    }

    impl From<super::MazeConfig> for MazeConfig {
        fn from(config: super::MazeConfig) -> Self {
            Self {
                rows: config.size.0,
                cols: config.size.1,
                mines: config.mines,
            }
        }
    }
}
