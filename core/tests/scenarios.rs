use minemaze_core::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn classic(size: Coord2, mines: &[Coord2]) -> GameState {
    let layout = MineLayout::from_mine_coords(size, mines).unwrap();
    let config = GameConfig::new(size, mines.len() as CellCount);
    GameState::new(config, layout).unwrap()
}

#[test]
fn two_by_two_is_won_by_clearing_every_safe_cell() {
    let state = classic((2, 2), &[(0, 0)]);

    let (state, outcome) = state.reveal((1, 1)).unwrap();
    assert_eq!(outcome, RevealOutcome::Revealed);
    assert_eq!(state.cell_at((1, 1)).unwrap().adjacent_mines, 1);

    let (state, _) = state.reveal((0, 1)).unwrap();
    let (state, outcome) = state.reveal((1, 0)).unwrap();

    assert_eq!(outcome, RevealOutcome::Won);
    assert_eq!(state.status(), GameStatus::Won);
    assert!(!state.cell_at((0, 0)).unwrap().revealed);

    // a finished game ignores further input
    let (after, outcome) = state.reveal((0, 0)).unwrap();
    assert_eq!(outcome, RevealOutcome::NoChange);
    assert_eq!(after, state);
}

#[test]
fn mine_free_board_opens_in_one_click() {
    let state = classic((3, 3), &[]);

    let (state, outcome) = state.reveal((1, 1)).unwrap();

    assert_eq!(outcome, RevealOutcome::Won);
    assert!(state.board().iter().all(|cell| cell.revealed));
}

#[test]
fn hitting_a_mine_loses() {
    let state = classic((3, 3), &[(2, 2)]);
    let (state, _) = state.toggle_flag((0, 0)).unwrap();

    let (state, outcome) = state.reveal((2, 2)).unwrap();

    assert_eq!(outcome, RevealOutcome::HitMine);
    assert_eq!(state.status(), GameStatus::Lost);
    assert!(state.cell_at((2, 2)).unwrap().revealed);
    assert_eq!(state.flags_left(), 0);
}

#[test]
fn generated_mazes_are_always_winnable() {
    let config = MazeConfig::new((8, 8), 5);
    for seed in 0..100 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let state = generate_maze(config, &mut rng).unwrap();

        let path = find_path(state.terrain(), state.player(), state.exit()).unwrap();
        assert!(path.len() > usize::from(config.min_distance()));
        for coords in state.path() {
            assert!(!state.mines().contains(coords));
        }
        let keys = state
            .chests()
            .iter()
            .filter(|chest| chest.content == ChestContent::Key)
            .count();
        assert!(keys >= state.doors().len());
    }
}

/// `S K . D E` in a single row.
fn corridor() -> MazeState {
    let terrain = ndarray::Array2::from_elem((1, 5), Terrain::Open);
    MazeLayout::new(
        terrain,
        (0, 0),
        (0, 4),
        vec![(0, 3)],
        vec![Chest {
            coords: (0, 1),
            content: ChestContent::Key,
        }],
        vec![],
    )
    .unwrap()
    .into_state()
}

#[test]
fn door_stays_locked_until_a_key_is_found() {
    let state = corridor();

    let (state, outcome) = state.reveal((0, 3), false).unwrap();
    assert_eq!(outcome, MazeRevealOutcome::DoorLocked);
    assert_eq!(outcome.message(), Some("You need a key to unlock this door!"));
    assert!(!state.cell_at((0, 3)).unwrap().revealed);
}

#[test]
fn corridor_can_be_walked_to_the_exit() {
    let mut maze = corridor();

    let (state, _) = maze.reveal((0, 1), false).unwrap();
    assert_eq!(state.feedback(), vec![((0, 1), Opened::Key)]);
    maze = state.clear_feedback();
    assert!(maze.feedback().is_empty());

    let (state, outcome) = maze.reveal((0, 3), false).unwrap();
    assert_eq!(outcome, MazeRevealOutcome::Revealed);
    assert_eq!(state.inventory().keys, 0);
    maze = state;

    let mut outcome = MoveOutcome::Blocked;
    for _ in 0..4 {
        let (state, moved) = maze.step(Direction::Right);
        maze = state;
        outcome = moved;
    }
    assert_eq!(outcome, MoveOutcome::Escaped);
    assert!(maze.is_won());
}

#[test]
fn session_plays_a_full_classic_round() {
    let mut session = Session::new(7);
    session.start_classic(Difficulty::Easy.config());

    let outcome = session.reveal((0, 0)).unwrap();
    assert_ne!(outcome, SessionReveal::Classic(RevealOutcome::HitMine));

    let state = session.game().and_then(Game::as_classic).unwrap();
    let safe: Vec<Coord2> = iter_coords(state.size())
        .filter(|&coords| {
            let cell = state.cell_at(coords).unwrap();
            !cell.mine && !cell.revealed
        })
        .collect();
    for coords in safe {
        session.reveal(coords).unwrap();
    }

    assert_eq!(session.status(), Some(GameStatus::Won));
    assert!(session.undo());
    assert_eq!(session.status(), Some(GameStatus::Playing));
}

#[test]
fn mid_game_state_survives_json() {
    let state = classic((4, 4), &[(0, 0), (3, 3)]);
    let (state, _) = state.reveal((0, 3)).unwrap();
    let (state, _) = state.toggle_flag((0, 0)).unwrap();

    let json = serde_json::to_string(&state).unwrap();
    let restored: GameState = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, state);
}

#[test]
fn config_json_uses_flat_fields() {
    let config = GameConfig::from_json(r#"{"rows":16,"cols":30,"mines":99}"#).unwrap();
    assert_eq!(config.size, (16, 30));
    assert_eq!(config.mines, 99);

    assert_eq!(
        GameConfig::from_json(r#"{"rows":0,"cols":3,"mines":1}"#),
        Err(GameError::InvalidConfig)
    );
    assert_eq!("expert".parse::<Difficulty>(), Err(GameError::UnknownDifficulty));
}
