use alloc::collections::{BTreeSet, VecDeque};
use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

/// A classic game as a value: every transition returns a new state and leaves
/// `self` untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    board: Array2<Cell>,
    status: GameStatus,
    flags_left: CellCount,
    revealed_count: CellCount,
    safe_count: CellCount,
    config: GameConfig,
}

impl GameState {
    /// Shuffles a fresh board for `config`.
    pub fn new_game<R: Rng + ?Sized>(config: GameConfig, rng: &mut R) -> Self {
        Self::from_layout(config, shuffled_layout(config, rng))
    }

    /// Materializes cells and adjacency counts for a given mine placement.
    ///
    /// `config.mines` sets the flag budget even when the layout holds fewer mines.
    /// The layout must have exactly `config.size`.
    pub fn new(config: GameConfig, layout: MineLayout) -> Result<Self> {
        if layout.size() != config.size {
            log::warn!(
                "layout of {:?} does not fit a {:?} board",
                layout.size(),
                config.size
            );
            return Err(GameError::InvalidBoardShape);
        }
        Ok(Self::from_layout(config, layout))
    }

    /// Callers guarantee `layout.size() == config.size`.
    pub(crate) fn from_layout(config: GameConfig, layout: MineLayout) -> Self {
        let board = Array2::from_shape_fn(layout.size().to_nd_index(), |(row, col)| {
            let coords = (row as Coord, col as Coord);
            let mine = layout.contains_mine(coords);
            Cell {
                mine,
                adjacent_mines: if mine {
                    0
                } else {
                    layout.adjacent_mine_count(coords)
                },
                ..Default::default()
            }
        });

        Self {
            board,
            status: GameStatus::Playing,
            flags_left: config.mines,
            revealed_count: 0,
            safe_count: layout.safe_cell_count(),
            config,
        }
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

    pub fn flags_left(&self) -> CellCount {
        self.flags_left
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn size(&self) -> Coord2 {
        grid_size(&self.board)
    }

    pub fn board(&self) -> &Array2<Cell> {
        &self.board
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<Cell> {
        let coords = self.validate_coords(coords)?;
        Ok(self.board[coords.to_nd_index()])
    }

    pub fn mine_count(&self) -> CellCount {
        // the board never holds more than CellCount::MAX cells
        self.board.iter().filter(|cell| cell.mine).count() as CellCount
    }

    /// True before the first cell has been revealed.
    pub fn is_untouched(&self) -> bool {
        self.revealed_count == 0 && !self.is_over()
    }

    pub fn reveal(&self, coords: Coord2) -> Result<(Self, RevealOutcome)> {
        let coords = self.validate_coords(coords)?;
        let cell = self.board[coords.to_nd_index()];

        if self.is_over() || cell.flagged || cell.revealed {
            return Ok((self.clone(), RevealOutcome::NoChange));
        }

        let mut next = self.clone();
        let outcome = next.reveal_hidden_cell(coords);
        Ok((next, outcome))
    }

    pub fn toggle_flag(&self, coords: Coord2) -> Result<(Self, MarkOutcome)> {
        let coords = self.validate_coords(coords)?;
        let cell = self.board[coords.to_nd_index()];

        if self.is_over() || cell.revealed {
            return Ok((self.clone(), MarkOutcome::NoChange));
        }

        let mut next = self.clone();
        let outcome = if cell.flagged {
            next.board[coords.to_nd_index()].flagged = false;
            next.flags_left += 1;
            MarkOutcome::Changed
        } else if next.flags_left > 0 {
            next.board[coords.to_nd_index()].flagged = true;
            next.flags_left -= 1;
            MarkOutcome::Changed
        } else {
            log::debug!("no flags left, ignoring flag at {:?}", coords);
            MarkOutcome::NoChange
        };
        Ok((next, outcome))
    }

    fn reveal_hidden_cell(&mut self, coords: Coord2) -> RevealOutcome {
        let cell = &mut self.board[coords.to_nd_index()];
        cell.revealed = true;
        let Cell {
            mine,
            adjacent_mines,
            ..
        } = *cell;

        if mine {
            log::debug!("mine hit at {:?}", coords);
            self.status = GameStatus::Lost;
            return RevealOutcome::HitMine;
        }

        self.revealed_count += 1;
        log::debug!("revealed {:?}, adjacent mines: {}", coords, adjacent_mines);
        if adjacent_mines == 0 {
            self.flood_fill(coords);
        }

        if self.revealed_count >= self.safe_count {
            self.status = GameStatus::Won;
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        }
    }

    /// Opens the zero region around `origin` and its numbered border.
    fn flood_fill(&mut self, origin: Coord2) {
        let mut visited = BTreeSet::from([origin]);
        let mut to_visit: VecDeque<_> = self
            .board
            .iter_neighbors(origin, Neighborhood::Moore)
            .collect();
        log::trace!("starting flood fill from {:?}", origin);

        while let Some(visit_coords) = to_visit.pop_front() {
            if !visited.insert(visit_coords) {
                continue;
            }

            let cell = &mut self.board[visit_coords.to_nd_index()];
            if cell.revealed || cell.flagged || cell.mine {
                continue;
            }

            cell.revealed = true;
            self.revealed_count += 1;

            if cell.adjacent_mines == 0 {
                to_visit.extend(
                    self.board
                        .iter_neighbors(visit_coords, Neighborhood::Moore)
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }
    }

    fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn game(size: Coord2, mines: &[Coord2]) -> GameState {
        let layout = MineLayout::from_mine_coords(size, mines).unwrap();
        GameState::new(GameConfig::new(size, mines.len() as CellCount), layout).unwrap()
    }

    fn revealed_count(state: &GameState) -> usize {
        state.board().iter().filter(|cell| cell.revealed).count()
    }

    #[test]
    fn new_game_places_exact_mine_count() {
        let mut rng = SmallRng::seed_from_u64(7);
        let state = GameState::new_game(GameConfig::new((5, 5), 5), &mut rng);

        assert_eq!(state.size(), (5, 5));
        assert_eq!(state.mine_count(), 5);
        assert_eq!(state.flags_left(), 5);
        assert_eq!(state.status(), GameStatus::Playing);
    }

    #[test]
    fn overfull_config_fills_board_and_keeps_flag_budget() {
        let mut rng = SmallRng::seed_from_u64(1);
        let state = GameState::new_game(GameConfig::new((2, 2), 9), &mut rng);

        assert_eq!(state.mine_count(), 4);
        assert_eq!(state.flags_left(), 9);
    }

    #[test]
    fn mismatched_layout_is_rejected() {
        let layout = MineLayout::from_mine_coords((3, 3), &[(0, 0)]).unwrap();

        assert_eq!(
            GameState::new(GameConfig::new((3, 4), 1), layout.clone()),
            Err(GameError::InvalidBoardShape)
        );
        assert_eq!(
            GameState::new(GameConfig::new((3, 3), 1), layout)
                .unwrap()
                .size(),
            (3, 3)
        );
    }

    #[test]
    fn adjacency_counts_are_computed_for_safe_cells() {
        let state = game((3, 3), &[(0, 0), (0, 2)]);

        assert_eq!(state.cell_at((1, 1)).unwrap().adjacent_mines, 2);
        assert_eq!(state.cell_at((0, 1)).unwrap().adjacent_mines, 2);
        assert_eq!(state.cell_at((2, 2)).unwrap().adjacent_mines, 0);
        assert_eq!(state.cell_at((0, 0)).unwrap().adjacent_mines, 0);
    }

    #[test]
    fn reveal_mine_loses_and_marks_cell() {
        let state = game((2, 2), &[(0, 0)]);

        let (next, outcome) = state.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::HitMine);
        assert_eq!(next.status(), GameStatus::Lost);
        assert!(next.cell_at((0, 0)).unwrap().revealed);
        assert!(!state.cell_at((0, 0)).unwrap().revealed);
    }

    #[test]
    fn flood_fill_stops_at_numbered_border() {
        // mine in the far corner of a 4x4 board
        let state = game((4, 4), &[(3, 3)]);

        let (next, outcome) = state.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(revealed_count(&next), 15);
        assert!(next.cell_at((2, 2)).unwrap().revealed);
        assert!(!next.cell_at((3, 3)).unwrap().revealed);
    }

    #[test]
    fn flood_fill_skips_flagged_cells() {
        let state = game((1, 5), &[(0, 4)]);
        let (flagged, outcome) = state.toggle_flag((0, 2)).unwrap();
        assert_eq!(outcome, MarkOutcome::Changed);

        let (next, outcome) = flagged.reveal((0, 0)).unwrap();
        assert_eq!(outcome, RevealOutcome::Revealed);
        assert!(next.cell_at((0, 1)).unwrap().revealed);
        assert!(!next.cell_at((0, 2)).unwrap().revealed);
        assert!(!next.cell_at((0, 3)).unwrap().revealed);
    }

    #[test]
    fn full_flood_on_empty_board() {
        let state = game((3, 3), &[]);

        let (next, outcome) = state.reveal((1, 1)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert!(next.board().iter().all(|cell| cell.revealed));
        assert!(next.is_won());
    }

    #[test]
    fn reveal_is_idempotent_on_revealed_and_flagged_cells() {
        let state = game((2, 2), &[(1, 1)]);
        let (once, _) = state.reveal((0, 0)).unwrap();
        let (twice, outcome) = once.reveal((0, 0)).unwrap();
        assert_eq!(outcome, RevealOutcome::NoChange);
        assert_eq!(once, twice);

        let (flagged, _) = state.toggle_flag((0, 1)).unwrap();
        let (after, outcome) = flagged.reveal((0, 1)).unwrap();
        assert_eq!(outcome, RevealOutcome::NoChange);
        assert!(!after.cell_at((0, 1)).unwrap().revealed);
    }

    #[test]
    fn win_does_not_require_flags() {
        let state = game((2, 2), &[(0, 1)]);
        let mut current = state;
        for coords in [(1, 1), (0, 0), (1, 0)] {
            current = current.reveal(coords).unwrap().0;
        }

        assert_eq!(current.status(), GameStatus::Won);
        assert_eq!(current.flags_left(), 1);
    }

    #[test]
    fn finished_game_accepts_no_moves() {
        let state = game((2, 2), &[(0, 0)]);
        let (lost, _) = state.reveal((0, 0)).unwrap();

        let (after, outcome) = lost.reveal((1, 1)).unwrap();
        assert_eq!(outcome, RevealOutcome::NoChange);
        assert!(!after.cell_at((1, 1)).unwrap().revealed);

        let (after, outcome) = lost.toggle_flag((1, 1)).unwrap();
        assert_eq!(outcome, MarkOutcome::NoChange);
        assert!(!after.cell_at((1, 1)).unwrap().flagged);
    }

    #[test]
    fn toggle_flag_twice_restores_state() {
        let state = game((3, 3), &[(0, 0), (2, 2)]);

        let (flagged, _) = state.toggle_flag((1, 1)).unwrap();
        assert!(flagged.cell_at((1, 1)).unwrap().flagged);
        assert_eq!(flagged.flags_left(), 1);

        let (restored, _) = flagged.toggle_flag((1, 1)).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn flag_budget_is_enforced() {
        let state = game((2, 2), &[(0, 0)]);
        let (flagged, _) = state.toggle_flag((0, 1)).unwrap();
        assert_eq!(flagged.flags_left(), 0);

        let (after, outcome) = flagged.toggle_flag((1, 0)).unwrap();
        assert_eq!(outcome, MarkOutcome::NoChange);
        assert!(!after.cell_at((1, 0)).unwrap().flagged);
    }

    #[test]
    fn revealed_cells_cannot_be_flagged() {
        let state = game((2, 2), &[(0, 0)]);
        let (revealed, _) = state.reveal((1, 1)).unwrap();

        let (after, outcome) = revealed.toggle_flag((1, 1)).unwrap();
        assert_eq!(outcome, MarkOutcome::NoChange);
        assert!(!after.cell_at((1, 1)).unwrap().flagged);
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let state = game((2, 2), &[]);
        assert_eq!(state.reveal((2, 0)), Err(GameError::OutOfBounds));
        assert_eq!(state.toggle_flag((0, 5)).map(|(_, o)| o), Err(GameError::OutOfBounds));
    }
}
