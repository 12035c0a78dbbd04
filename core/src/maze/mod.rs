//! Maze mode: minesweeping inside a walled grid with keys, doors and defusers.

use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;
pub use engine::*;

mod engine;

/// A chest placed on the guaranteed path and what it holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chest {
    pub coords: Coord2,
    pub content: ChestContent,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub keys: u32,
    pub defusers: u32,
}

/// Everything the generator decides, before any cell state exists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MazeLayout {
    terrain: Array2<Terrain>,
    path: Vec<Coord2>,
    doors: Vec<Coord2>,
    chests: Vec<Chest>,
    mines: Vec<Coord2>,
}

impl MazeLayout {
    /// Builds a layout around the shortest path from `start` to `exit`.
    pub fn new(
        terrain: Array2<Terrain>,
        start: Coord2,
        exit: Coord2,
        doors: Vec<Coord2>,
        chests: Vec<Chest>,
        mines: Vec<Coord2>,
    ) -> Result<Self> {
        let path = find_path(&terrain, start, exit)
            .ok_or(GameError::InvalidLayout("no open path from start to exit"))?;
        Self::with_path(terrain, path, doors, chests, mines)
    }

    /// Builds a layout around an explicit start-to-exit walk.
    pub fn with_path(
        terrain: Array2<Terrain>,
        path: Vec<Coord2>,
        doors: Vec<Coord2>,
        chests: Vec<Chest>,
        mines: Vec<Coord2>,
    ) -> Result<Self> {
        let layout = Self {
            terrain,
            path,
            doors,
            chests,
            mines,
        };
        layout.validate()?;
        Ok(layout)
    }

    pub fn size(&self) -> Coord2 {
        grid_size(&self.terrain)
    }

    pub fn terrain(&self) -> &Array2<Terrain> {
        &self.terrain
    }

    pub fn start(&self) -> Coord2 {
        self.path[0]
    }

    pub fn exit(&self) -> Coord2 {
        self.path[self.path.len() - 1]
    }

    pub fn path(&self) -> &[Coord2] {
        &self.path
    }

    pub fn doors(&self) -> &[Coord2] {
        &self.doors
    }

    pub fn chests(&self) -> &[Chest] {
        &self.chests
    }

    pub fn mines(&self) -> &[Coord2] {
        &self.mines
    }

    /// Cells no mine may occupy: the path, chests, doors, start and exit.
    pub fn is_forbidden(&self, coords: Coord2) -> bool {
        self.path.contains(&coords)
            || self.doors.contains(&coords)
            || self.chests.iter().any(|chest| chest.coords == coords)
    }

    /// Re-checks every placement guarantee with the path finder.
    pub fn validate(&self) -> Result<()> {
        use GameError::InvalidLayout;

        let (Some(&start), Some(&exit)) = (self.path.first(), self.path.last()) else {
            return Err(InvalidLayout("path is empty"));
        };
        if !self.path.iter().all(|&coords| self.is_open(coords)) {
            return Err(InvalidLayout("path leaves the open cells"));
        }
        if self.path.windows(2).any(|pair| manhattan(pair[0], pair[1]) != 1) {
            return Err(InvalidLayout("path is not a connected walk"));
        }

        let reachable = reachable_from(&self.terrain, start);
        let placements = self
            .doors
            .iter()
            .chain(self.chests.iter().map(|chest| &chest.coords));
        for &coords in placements {
            if !self.is_open(coords) || !reachable[coords.to_nd_index()] {
                return Err(InvalidLayout("door or chest is not reachable from start"));
            }
            if coords == start || coords == exit {
                return Err(InvalidLayout("door or chest sits on start or exit"));
            }
        }

        for &coords in &self.mines {
            if !self.is_open(coords) {
                return Err(InvalidLayout("mine outside the open cells"));
            }
            if self.is_forbidden(coords) {
                return Err(InvalidLayout("mine on the guaranteed path"));
            }
        }

        let keys = self
            .chests
            .iter()
            .filter(|chest| chest.content == ChestContent::Key)
            .count();
        if keys < self.doors.len() {
            return Err(InvalidLayout("fewer keys than doors"));
        }

        Ok(())
    }

    /// Materializes the cell grid; only the start cell begins revealed.
    pub fn into_state(self) -> MazeState {
        let size = self.size();
        let mut cells: Array2<MazeCell> = Array2::default(size.to_nd_index());

        for &coords in &self.mines {
            cells[coords.to_nd_index()].mine = true;
        }
        for chest in &self.chests {
            cells[chest.coords.to_nd_index()].chest = true;
        }
        for &coords in &self.doors {
            cells[coords.to_nd_index()].door = true;
        }
        for coords in iter_coords(size) {
            if self.is_open(coords) && !cells[coords.to_nd_index()].mine {
                cells[coords.to_nd_index()].adjacent_mines = count_adjacent_mines(&cells, coords);
            }
        }

        let start = self.start();
        let exit = self.exit();
        cells[start.to_nd_index()].revealed = true;

        MazeState {
            terrain: self.terrain,
            cells,
            player: start,
            exit,
            path: self.path,
            mines: self.mines,
            chests: self.chests,
            doors: self.doors,
            status: GameStatus::Playing,
            inventory: Inventory::default(),
        }
    }

    fn is_open(&self, coords: Coord2) -> bool {
        self.terrain
            .get(coords.to_nd_index())
            .is_some_and(|tile| tile.is_open())
    }
}

/// A maze game as a value; transitions live in [`engine`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MazeState {
    terrain: Array2<Terrain>,
    cells: Array2<MazeCell>,
    player: Coord2,
    exit: Coord2,
    path: Vec<Coord2>,
    mines: Vec<Coord2>,
    chests: Vec<Chest>,
    doors: Vec<Coord2>,
    status: GameStatus,
    inventory: Inventory,
}

impl MazeState {
    pub fn size(&self) -> Coord2 {
        grid_size(&self.terrain)
    }

    pub fn rows(&self) -> Coord {
        self.size().0
    }

    pub fn cols(&self) -> Coord {
        self.size().1
    }

    pub fn terrain(&self) -> &Array2<Terrain> {
        &self.terrain
    }

    pub fn terrain_at(&self, coords: Coord2) -> Result<Terrain> {
        let coords = self.validate_coords(coords)?;
        Ok(self.terrain[coords.to_nd_index()])
    }

    pub fn cells(&self) -> &Array2<MazeCell> {
        &self.cells
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<MazeCell> {
        let coords = self.validate_coords(coords)?;
        Ok(self.cells[coords.to_nd_index()])
    }

    pub fn player(&self) -> Coord2 {
        self.player
    }

    pub fn exit(&self) -> Coord2 {
        self.exit
    }

    /// The start-to-exit walk guaranteed at generation time.
    pub fn path(&self) -> &[Coord2] {
        &self.path
    }

    /// Live mines; a defused mine leaves this list.
    pub fn mines(&self) -> &[Coord2] {
        &self.mines
    }

    /// Every chest placed at generation time, opened or not.
    pub fn chests(&self) -> &[Chest] {
        &self.chests
    }

    pub fn chest_content(&self, coords: Coord2) -> Option<ChestContent> {
        self.chests
            .iter()
            .find(|chest| chest.coords == coords)
            .map(|chest| chest.content)
    }

    /// Every door placed at generation time, locked or not.
    pub fn doors(&self) -> &[Coord2] {
        &self.doors
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status.is_over()
    }

    pub fn is_won(&self) -> bool {
        self.status.is_won()
    }

    pub fn inventory(&self) -> Inventory {
        self.inventory
    }

    pub(crate) fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds)
        }
    }
}

fn count_adjacent_mines(cells: &Array2<MazeCell>, coords: Coord2) -> u8 {
    cells
        .iter_neighbors(coords, Neighborhood::Moore)
        .filter(|&pos| cells[pos.to_nd_index()].mine)
        .count() as u8
}
