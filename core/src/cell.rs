use serde::{Deserialize, Serialize};

/// A square of the classic board.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub revealed: bool,
    pub flagged: bool,
    pub mine: bool,
    /// Mines in the surrounding eight cells, always 0 on a mine.
    pub adjacent_mines: u8,
}

/// Static ground of the maze: the `0`/`1` grid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Open,
    Wall,
}

impl Terrain {
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    pub const fn is_wall(self) -> bool {
        matches!(self, Self::Wall)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChestContent {
    Key,
    Defuser,
}

/// One-shot marker left on a cell so the UI can announce what just happened there.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Opened {
    Key,
    Defuser,
    Door,
}

impl Opened {
    pub const fn message(self) -> &'static str {
        match self {
            Self::Key => "You found a key!",
            Self::Defuser => "You found a bomb defuser!",
            Self::Door => "You unlocked a door!",
        }
    }
}

impl From<ChestContent> for Opened {
    fn from(content: ChestContent) -> Self {
        match content {
            ChestContent::Key => Self::Key,
            ChestContent::Defuser => Self::Defuser,
        }
    }
}

/// A square of the maze. Walls keep every flag cleared.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeCell {
    pub revealed: bool,
    pub flagged: bool,
    pub mine: bool,
    pub adjacent_mines: u8,
    /// Unopened chest.
    pub chest: bool,
    /// Locked door.
    pub door: bool,
    pub just_opened: Option<Opened>,
}

impl MazeCell {
    /// A cell the player may stand on.
    pub const fn is_walkable(&self) -> bool {
        self.revealed && !self.mine && !self.door
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chest_contents_announce_themselves() {
        assert_eq!(Opened::from(ChestContent::Key).message(), "You found a key!");
        assert_eq!(
            Opened::from(ChestContent::Defuser).message(),
            "You found a bomb defuser!"
        );
        assert_eq!(Opened::Door.message(), "You unlocked a door!");
    }

    #[test]
    fn doors_and_mines_are_not_walkable() {
        let open = MazeCell {
            revealed: true,
            ..Default::default()
        };
        assert!(open.is_walkable());
        assert!(!MazeCell { door: true, ..open }.is_walkable());
        assert!(!MazeCell { mine: true, ..open }.is_walkable());
        assert!(!MazeCell::default().is_walkable());
    }
}
