use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use super::MazeState;
use crate::*;

/// Result of revealing a maze cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MazeRevealOutcome {
    NoChange,
    Revealed,
    /// A locked door was hit with no key in hand. Nothing was unlocked, but a
    /// chest opened by the same call stays opened.
    DoorLocked,
    /// A mine was neutralized with a defuser.
    Defused,
    /// A mine went off and the game is lost.
    Detonated,
}

impl MazeRevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }

    pub const fn message(self) -> Option<&'static str> {
        match self {
            Self::DoorLocked => Some("You need a key to unlock this door!"),
            Self::Detonated => Some("You hit a mine!"),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Blocked,
    Moved,
    Escaped,
}

/// Arrow-key movement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }
}

impl MazeState {
    /// Reveals a cell, opening chests and doors on the way.
    ///
    /// With `use_defuser`, a mine under the cell is neutralized instead of
    /// ending the game as long as a defuser is held.
    pub fn reveal(&self, coords: Coord2, use_defuser: bool) -> Result<(Self, MazeRevealOutcome)> {
        let coords = self.validate_coords(coords)?;
        let cell = self.cells[coords.to_nd_index()];

        if self.is_over()
            || self.terrain[coords.to_nd_index()].is_wall()
            || cell.revealed
            || cell.flagged
        {
            return Ok((self.clone(), MazeRevealOutcome::NoChange));
        }

        let mut next = self.clone();
        let outcome = next.reveal_hidden_cell(coords, use_defuser);
        Ok((next, outcome))
    }

    /// Flags or unflags a hidden open cell. Maze mode has no flag budget.
    pub fn toggle_flag(&self, coords: Coord2) -> Result<(Self, MarkOutcome)> {
        let coords = self.validate_coords(coords)?;

        if self.is_over()
            || self.terrain[coords.to_nd_index()].is_wall()
            || self.cells[coords.to_nd_index()].revealed
        {
            return Ok((self.clone(), MarkOutcome::NoChange));
        }

        let mut next = self.clone();
        let cell = &mut next.cells[coords.to_nd_index()];
        cell.flagged = !cell.flagged;
        Ok((next, MarkOutcome::Changed))
    }

    /// Walks the player one orthogonal step onto an already revealed cell.
    pub fn move_to(&self, target: Coord2) -> Result<(Self, MoveOutcome)> {
        let target = self.validate_coords(target)?;

        if self.is_over()
            || manhattan(self.player, target) != 1
            || !self.cells[target.to_nd_index()].is_walkable()
        {
            return Ok((self.clone(), MoveOutcome::Blocked));
        }

        let mut next = self.clone();
        next.player = target;
        if target == next.exit {
            log::debug!("player escaped through {:?}", target);
            next.status = GameStatus::Won;
            Ok((next, MoveOutcome::Escaped))
        } else {
            Ok((next, MoveOutcome::Moved))
        }
    }

    /// Like [`MazeState::move_to`], addressed relative to the player.
    pub fn step(&self, direction: Direction) -> (Self, MoveOutcome) {
        match offset(self.player, direction.delta(), self.size()) {
            Some(target) => self
                .move_to(target)
                .unwrap_or_else(|_| (self.clone(), MoveOutcome::Blocked)),
            None => (self.clone(), MoveOutcome::Blocked),
        }
    }

    /// Spends a defuser on the first hidden mine orthogonally next to the player.
    ///
    /// Neighbors are scanned right, down, left, up. Flagged mines are passed
    /// over rather than stopping the scan, so a flag on the first match moves
    /// the defuser on to the next mine in that order.
    pub fn use_defuser_on_adjacent_mine(&self) -> (Self, MazeRevealOutcome) {
        if self.is_over() || self.inventory.defusers == 0 {
            return (self.clone(), MazeRevealOutcome::NoChange);
        }

        let target = self
            .cells
            .iter_neighbors(self.player, Neighborhood::Orthogonal)
            .find(|&pos| {
                let cell = self.cells[pos.to_nd_index()];
                cell.mine && !cell.revealed && !cell.flagged
            });

        match target {
            Some(coords) => self
                .reveal(coords, true)
                .unwrap_or_else(|_| (self.clone(), MazeRevealOutcome::NoChange)),
            None => (self.clone(), MazeRevealOutcome::NoChange),
        }
    }

    /// Pending one-shot markers, for the UI to announce.
    pub fn feedback(&self) -> Vec<(Coord2, Opened)> {
        iter_coords(self.size())
            .filter_map(|coords| {
                self.cells[coords.to_nd_index()]
                    .just_opened
                    .map(|opened| (coords, opened))
            })
            .collect()
    }

    /// Drops every one-shot marker once the UI has shown it.
    pub fn clear_feedback(&self) -> Self {
        let mut next = self.clone();
        next.cells.iter_mut().for_each(|cell| cell.just_opened = None);
        next
    }

    fn reveal_hidden_cell(&mut self, coords: Coord2, use_defuser: bool) -> MazeRevealOutcome {
        if self.cells[coords.to_nd_index()].chest {
            self.open_chest(coords);
        }

        if self.cells[coords.to_nd_index()].door {
            if self.inventory.keys == 0 {
                log::debug!("door at {:?} is locked and no key is held", coords);
                return MazeRevealOutcome::DoorLocked;
            }
            self.inventory.keys -= 1;
            let cell = &mut self.cells[coords.to_nd_index()];
            cell.door = false;
            cell.just_opened = Some(Opened::Door);
            log::debug!("unlocked door at {:?}", coords);
        }

        self.cells[coords.to_nd_index()].revealed = true;

        let mut outcome = MazeRevealOutcome::Revealed;
        if self.cells[coords.to_nd_index()].mine {
            if !(use_defuser && self.inventory.defusers > 0) {
                self.detonate(coords);
                return MazeRevealOutcome::Detonated;
            }
            self.defuse(coords);
            outcome = MazeRevealOutcome::Defused;
        }

        if self.cells[coords.to_nd_index()].adjacent_mines == 0 {
            self.flood_fill(coords);
        }
        outcome
    }

    fn open_chest(&mut self, coords: Coord2) {
        let cell = &mut self.cells[coords.to_nd_index()];
        cell.chest = false;

        let Some(content) = self
            .chests
            .iter()
            .find(|chest| chest.coords == coords)
            .map(|chest| chest.content)
        else {
            log::warn!("chest at {:?} has no recorded content", coords);
            return;
        };

        cell.just_opened = Some(content.into());
        match content {
            ChestContent::Key => self.inventory.keys += 1,
            ChestContent::Defuser => self.inventory.defusers += 1,
        }
        log::debug!("opened chest at {:?}: {:?}", coords, content);
    }

    fn detonate(&mut self, coords: Coord2) {
        log::debug!("mine detonated at {:?}", coords);
        for &mine in &self.mines {
            self.cells[mine.to_nd_index()].revealed = true;
        }
        self.status = GameStatus::Lost;
    }

    /// Turns the mine at `coords` into an ordinary cell and fixes the counts around it.
    ///
    /// Clearing only the mine bit would leave neighbours reporting a mine that
    /// is gone; instead every open neighbour loses one from its count and the
    /// defused cell counts the mines still around it, flooding only at zero.
    fn defuse(&mut self, coords: Coord2) {
        self.inventory.defusers -= 1;
        self.mines.retain(|&mine| mine != coords);
        self.cells[coords.to_nd_index()].mine = false;

        let mut own_count = 0;
        for pos in self.cells.iter_neighbors(coords, Neighborhood::Moore) {
            let neighbor = &mut self.cells[pos.to_nd_index()];
            if neighbor.mine {
                own_count += 1;
            } else if self.terrain[pos.to_nd_index()].is_open() {
                neighbor.adjacent_mines = neighbor.adjacent_mines.saturating_sub(1);
            }
        }
        self.cells[coords.to_nd_index()].adjacent_mines = own_count;
        log::debug!("defused mine at {:?}, {} defusers left", coords, self.inventory.defusers);
    }

    /// Opens the zero region around `origin`; doors stop the spread.
    fn flood_fill(&mut self, origin: Coord2) {
        let size = self.size();
        let mut visited = ndarray::Array2::from_elem(size.to_nd_index(), false);
        visited[origin.to_nd_index()] = true;
        let mut stack = Vec::from([origin]);
        log::trace!("starting maze flood fill from {:?}", origin);

        while let Some(current) = stack.pop() {
            for pos in NeighborIter::new(current, size, Neighborhood::Moore) {
                if visited[pos.to_nd_index()] || self.terrain[pos.to_nd_index()].is_wall() {
                    continue;
                }
                visited[pos.to_nd_index()] = true;

                let cell = self.cells[pos.to_nd_index()];
                if cell.revealed || cell.mine || cell.flagged || cell.door {
                    continue;
                }

                self.cells[pos.to_nd_index()].revealed = true;
                if cell.chest {
                    self.open_chest(pos);
                }
                if cell.adjacent_mines == 0 {
                    stack.push(pos);
                }
            }
        }
    }
}
