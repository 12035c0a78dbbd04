//! Caller-owned context: the current game, its theme and its history.

use alloc::collections::{BTreeMap, VecDeque};
use alloc::string::String;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Opaque presentation settings, stored and handed back untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub class: String,
    #[serde(default)]
    pub assets: BTreeMap<String, String>,
}

impl Theme {
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            assets: BTreeMap::new(),
        }
    }

    pub fn with_asset(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.assets.insert(key.into(), value.into());
        self
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new("default", "")
    }
}

/// The game currently held by a session.
#[derive(Clone, Debug, PartialEq)]
pub enum Game {
    Classic(GameState),
    Maze(MazeState),
}

impl Game {
    pub fn status(&self) -> GameStatus {
        match self {
            Self::Classic(state) => state.status(),
            Self::Maze(state) => state.status(),
        }
    }

    pub fn as_classic(&self) -> Option<&GameState> {
        match self {
            Self::Classic(state) => Some(state),
            Self::Maze(_) => None,
        }
    }

    pub fn as_maze(&self) -> Option<&MazeState> {
        match self {
            Self::Maze(state) => Some(state),
            Self::Classic(_) => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Mode {
    Classic(GameConfig),
    Maze(MazeConfig),
}

/// Outcome of [`Session::reveal`] in either mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionReveal {
    Classic(RevealOutcome),
    Maze(MazeRevealOutcome),
}

/// One player's game session.
///
/// Holds the state the UI renders from, replacing it on every action and
/// keeping earlier states for [`Session::undo`].
#[derive(Clone, Debug)]
pub struct Session {
    theme: Theme,
    rng: SmallRng,
    mode: Option<Mode>,
    current: Option<Game>,
    history: VecDeque<Game>,
    safe_first_reveal: bool,
}

impl Session {
    /// Undo steps kept before the oldest is dropped.
    pub const HISTORY_LIMIT: usize = 256;

    pub fn new(seed: u64) -> Self {
        Self {
            theme: Theme::default(),
            rng: SmallRng::seed_from_u64(seed),
            mode: None,
            current: None,
            history: VecDeque::new(),
            safe_first_reveal: true,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        log::debug!("theme: {}", theme.name);
        self.theme = theme;
    }

    /// Whether the first classic reveal regenerates the board around a blank cell.
    pub fn set_safe_first_reveal(&mut self, enabled: bool) {
        self.safe_first_reveal = enabled;
    }

    pub fn game(&self) -> Option<&Game> {
        self.current.as_ref()
    }

    pub fn status(&self) -> Option<GameStatus> {
        self.current.as_ref().map(Game::status)
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn start_classic(&mut self, config: GameConfig) -> &Game {
        let state = GameState::new_game(config, &mut self.rng);
        self.mode = Some(Mode::Classic(config));
        self.replace_game(Game::Classic(state))
    }

    /// Fails with [`GameError::MazeUnsatisfiable`] and keeps the previous game.
    pub fn start_maze(&mut self, config: MazeConfig) -> Result<&Game> {
        let state = generate_maze(config, &mut self.rng)?;
        self.mode = Some(Mode::Maze(config));
        Ok(self.replace_game(Game::Maze(state)))
    }

    /// Starts over with the configuration of the current game.
    pub fn restart(&mut self) -> Result<()> {
        match self.mode.ok_or(GameError::NoActiveGame)? {
            Mode::Classic(config) => {
                self.start_classic(config);
            }
            Mode::Maze(config) => {
                self.start_maze(config)?;
            }
        }
        Ok(())
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<SessionReveal> {
        match self.current.as_ref().ok_or(GameError::NoActiveGame)? {
            Game::Classic(state) => {
                let state = state.clone();
                let state = self.prepare_first_reveal(state, coords)?;
                let (next, outcome) = state.reveal(coords)?;
                self.commit(Game::Classic(next), outcome.has_update());
                Ok(SessionReveal::Classic(outcome))
            }
            Game::Maze(state) => {
                let (next, outcome) = state.reveal(coords, false)?;
                self.commit(Game::Maze(next), outcome.has_update());
                Ok(SessionReveal::Maze(outcome))
            }
        }
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let (next, outcome) = match self.current.as_ref().ok_or(GameError::NoActiveGame)? {
            Game::Classic(state) => {
                let (next, outcome) = state.toggle_flag(coords)?;
                (Game::Classic(next), outcome)
            }
            Game::Maze(state) => {
                let (next, outcome) = state.toggle_flag(coords)?;
                (Game::Maze(next), outcome)
            }
        };
        self.commit(next, outcome.has_update());
        Ok(outcome)
    }

    pub fn move_player(&mut self, target: Coord2) -> Result<MoveOutcome> {
        let (next, outcome) = self.maze()?.move_to(target)?;
        self.commit(Game::Maze(next), outcome != MoveOutcome::Blocked);
        Ok(outcome)
    }

    pub fn step(&mut self, direction: Direction) -> Result<MoveOutcome> {
        let (next, outcome) = self.maze()?.step(direction);
        self.commit(Game::Maze(next), outcome != MoveOutcome::Blocked);
        Ok(outcome)
    }

    pub fn use_defuser(&mut self) -> Result<MazeRevealOutcome> {
        let (next, outcome) = self.maze()?.use_defuser_on_adjacent_mine();
        self.commit(Game::Maze(next), outcome.has_update());
        Ok(outcome)
    }

    /// Drops one-shot maze markers without recording an undo step.
    pub fn clear_feedback(&mut self) -> Result<()> {
        let next = self.maze()?.clear_feedback();
        self.current = Some(Game::Maze(next));
        Ok(())
    }

    /// Restores the state before the last action that changed anything.
    pub fn undo(&mut self) -> bool {
        match self.history.pop_back() {
            Some(previous) => {
                self.current = Some(previous);
                true
            }
            None => false,
        }
    }

    fn maze(&self) -> Result<&MazeState> {
        match self.current.as_ref().ok_or(GameError::NoActiveGame)? {
            Game::Maze(state) => Ok(state),
            Game::Classic(_) => Err(GameError::WrongMode),
        }
    }

    /// Rebuilds an untouched classic board so that `coords` opens a blank region.
    fn prepare_first_reveal(&mut self, state: GameState, coords: Coord2) -> Result<GameState> {
        state.cell_at(coords)?;
        if !self.safe_first_reveal || !state.is_untouched() {
            return Ok(state);
        }

        let config = *state.config();
        let layout = safe_start_layout(
            config,
            coords,
            SafeStartGenerator::DEFAULT_MAX_ATTEMPTS,
            &mut self.rng,
        );
        log::debug!("regenerated board around first reveal at {:?}", coords);
        Ok(GameState::from_layout(config, layout))
    }

    fn replace_game(&mut self, game: Game) -> &Game {
        self.history.clear();
        self.current.insert(game)
    }

    fn commit(&mut self, next: Game, changed: bool) {
        if !changed {
            return;
        }
        if let Some(previous) = self.current.replace(next) {
            if self.history.len() == Self::HISTORY_LIMIT {
                self.history.pop_front();
            }
            self.history.push_back(previous);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic(session: &Session) -> &GameState {
        session.game().and_then(Game::as_classic).unwrap()
    }

    #[test]
    fn actions_need_a_game() {
        let mut session = Session::new(1);
        assert_eq!(session.reveal((0, 0)), Err(GameError::NoActiveGame));
        assert_eq!(session.restart(), Err(GameError::NoActiveGame));
        assert_eq!(session.status(), None);
    }

    #[test]
    fn first_classic_reveal_opens_a_blank_region() {
        for seed in 0..10 {
            let mut session = Session::new(seed);
            session.start_classic(Difficulty::Easy.config());

            let outcome = session.reveal((4, 4)).unwrap();

            assert!(matches!(
                outcome,
                SessionReveal::Classic(RevealOutcome::Revealed | RevealOutcome::Won)
            ));
            let cell = classic(&session).cell_at((4, 4)).unwrap();
            assert!(cell.revealed && !cell.mine);
            assert_eq!(cell.adjacent_mines, 0);
            assert_eq!(classic(&session).mine_count(), 10);
        }
    }

    #[test]
    fn undo_restores_previous_states() {
        let mut session = Session::new(3);
        session.set_safe_first_reveal(false);
        let initial = session
            .start_classic(GameConfig::new((4, 4), 2))
            .as_classic()
            .unwrap()
            .clone();

        session.toggle_flag((0, 0)).unwrap();
        assert!(classic(&session).cell_at((0, 0)).unwrap().flagged);
        // a no-op records nothing
        session.toggle_flag((9, 9)).unwrap_err();

        assert!(session.undo());
        assert_eq!(classic(&session), &initial);
        assert!(!session.undo());
    }

    #[test]
    fn maze_only_actions_reject_classic_games() {
        let mut session = Session::new(5);
        session.start_classic(Difficulty::Easy.config());
        assert_eq!(session.step(Direction::Up), Err(GameError::WrongMode));
        assert_eq!(session.use_defuser(), Err(GameError::WrongMode));
    }

    #[test]
    fn maze_session_plays_and_restarts() {
        let mut session = Session::new(8);
        session.start_maze(MazeConfig::new((8, 8), 5)).unwrap();

        let outcome = session.step(Direction::Up).unwrap();
        if outcome == MoveOutcome::Blocked {
            assert!(!session.can_undo());
        }
        assert_eq!(session.status(), Some(GameStatus::Playing));

        session.restart().unwrap();
        assert!(!session.can_undo());
        let state = session.game().and_then(Game::as_maze).unwrap();
        assert_eq!(state.size(), (8, 8));
        assert_eq!(state.cells().iter().filter(|c| c.revealed).count(), 1);
    }

    #[test]
    fn failed_maze_keeps_the_previous_game() {
        let mut session = Session::new(2);
        session.start_classic(Difficulty::Easy.config());
        assert_eq!(
            session.start_maze(MazeConfig::new((1, 2), 0)),
            Err(GameError::MazeUnsatisfiable { attempts: 0 })
        );
        assert!(session.game().and_then(Game::as_classic).is_some());
        assert!(session.restart().is_ok());
    }

    #[test]
    fn theme_passes_through_untouched() {
        let theme = Theme::new("dark", "theme-dark").with_asset("mine", "mine.png");
        let mut session = Session::new(0).with_theme(theme.clone());
        assert_eq!(session.theme(), &theme);

        session.set_theme(Theme::default());
        assert_eq!(session.theme().name, "default");
        assert!(session.theme().assets.is_empty());
    }
}
