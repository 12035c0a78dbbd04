use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use ndarray::Array2;
use rand::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::index;

use super::*;

/// Chance of any single cell becoming a wall.
pub const WALL_PROBABILITY: f64 = 0.25;

/// Shortest path able to hold one door and two chests between start and exit.
const MIN_PATH_LEN: usize = 5;

/// Generates a maze and materializes its starting state.
pub fn generate_maze<R: Rng + ?Sized>(config: MazeConfig, rng: &mut R) -> Result<MazeState> {
    let layout = maze_layout(
        config,
        WALL_PROBABILITY,
        RandomMazeGenerator::DEFAULT_MAX_ATTEMPTS,
        rng,
    )?;
    Ok(layout.into_state())
}

/// Rejection-samples wall grids until one has a long enough start-to-exit
/// path, then places doors and chests along that path and mines off it.
///
/// `wall_probability` outside `0.0..=1.0` (NaN included) is an
/// [`GameError::InvalidConfig`].
pub fn maze_layout<R: Rng + ?Sized>(
    config: MazeConfig,
    wall_probability: f64,
    max_attempts: u32,
    rng: &mut R,
) -> Result<MazeLayout> {
    if !(0.0..=1.0).contains(&wall_probability) {
        log::warn!("wall probability {} is not a probability", wall_probability);
        return Err(GameError::InvalidConfig);
    }
    let (terrain, path) = carve_path(config, wall_probability, max_attempts, rng)?;
    let (doors, chests) = place_doors_and_chests(&path, rng);
    let mines = place_mines(&terrain, &path, &doors, &chests, config.mines, rng);
    MazeLayout::with_path(terrain, path, doors, chests, mines)
}

fn door_count(path_len: usize) -> usize {
    (path_len / 8).clamp(1, 2)
}

fn carve_path<R: Rng + ?Sized>(
    config: MazeConfig,
    wall_probability: f64,
    max_attempts: u32,
    rng: &mut R,
) -> Result<(Array2<Terrain>, Vec<Coord2>)> {
    let (rows, cols) = config.size;
    if usize::from(mult(rows, cols)) < MIN_PATH_LEN {
        log::warn!("{}x{} maze is too small to hold a door and its chests", rows, cols);
        return Err(GameError::MazeUnsatisfiable { attempts: 0 });
    }

    let min_dist = config.min_distance();
    for attempt in 1..=max_attempts {
        let terrain = Array2::from_shape_fn(config.size.to_nd_index(), |_| {
            if rng.random_bool(wall_probability) {
                Terrain::Wall
            } else {
                Terrain::Open
            }
        });

        let open: Vec<Coord2> = iter_coords(config.size)
            .filter(|&coords| terrain[coords.to_nd_index()].is_open())
            .collect();
        if open.len() < 2 {
            continue;
        }

        let start = open[rng.random_range(0..open.len())];
        let far: Vec<Coord2> = open
            .iter()
            .copied()
            .filter(|&coords| coords != start && manhattan(start, coords) >= min_dist)
            .collect();
        if far.is_empty() {
            continue;
        }
        let exit = far[rng.random_range(0..far.len())];

        let Some(path) = find_path(&terrain, start, exit) else {
            log::trace!("attempt {}: no path from {:?} to {:?}", attempt, start, exit);
            continue;
        };
        // interior cells must fit every door plus one chest more than doors
        if path.len() <= usize::from(min_dist) || path.len() < 2 * door_count(path.len()) + 3 {
            log::trace!("attempt {}: path of {} cells is too short", attempt, path.len());
            continue;
        }

        log::debug!(
            "maze accepted after {} attempts, path of {} cells from {:?} to {:?}",
            attempt,
            path.len(),
            start,
            exit
        );
        return Ok((terrain, path));
    }

    log::warn!("gave up on a {}x{} maze after {} attempts", rows, cols, max_attempts);
    Err(GameError::MazeUnsatisfiable {
        attempts: max_attempts,
    })
}

/// Picks distinct interior path cells: doors first, then key chests, then one defuser chest.
fn place_doors_and_chests<R: Rng + ?Sized>(path: &[Coord2], rng: &mut R) -> (Vec<Coord2>, Vec<Chest>) {
    let doors_wanted = door_count(path.len());
    let interior = &path[1..path.len() - 1];

    let mut picks = index::sample(rng, interior.len(), 2 * doors_wanted + 1)
        .into_iter()
        .map(|i| interior[i]);

    let doors: Vec<Coord2> = picks.by_ref().take(doors_wanted).collect();
    let chests: Vec<Chest> = picks
        .enumerate()
        .map(|(i, coords)| Chest {
            coords,
            content: if i < doors_wanted {
                ChestContent::Key
            } else {
                ChestContent::Defuser
            },
        })
        .collect();
    (doors, chests)
}

fn place_mines<R: Rng + ?Sized>(
    terrain: &Array2<Terrain>,
    path: &[Coord2],
    doors: &[Coord2],
    chests: &[Chest],
    mines: CellCount,
    rng: &mut R,
) -> Vec<Coord2> {
    let forbidden: BTreeSet<Coord2> = path
        .iter()
        .chain(doors)
        .copied()
        .chain(chests.iter().map(|chest| chest.coords))
        .collect();
    let candidates: Vec<Coord2> = iter_coords(grid_size(terrain))
        .filter(|coords| terrain[coords.to_nd_index()].is_open() && !forbidden.contains(coords))
        .collect();

    let wanted = usize::from(mines);
    let amount = wanted.min(candidates.len());
    if amount < wanted {
        log::warn!(
            "only {} cells are free for mines, requested {}",
            candidates.len(),
            wanted
        );
    }

    index::sample(rng, candidates.len(), amount)
        .into_iter()
        .map(|i| candidates[i])
        .collect()
}

/// Seeded maze generation with a bounded number of attempts.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMazeGenerator {
    seed: u64,
    max_attempts: u32,
    wall_probability: f64,
}

impl RandomMazeGenerator {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;

    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            wall_probability: WALL_PROBABILITY,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Clamped into `0.0..=1.0`; NaN falls back to [`WALL_PROBABILITY`].
    pub fn with_wall_probability(mut self, wall_probability: f64) -> Self {
        self.wall_probability = if wall_probability.is_nan() {
            WALL_PROBABILITY
        } else {
            wall_probability.clamp(0.0, 1.0)
        };
        self
    }
}

impl MazeLayoutGenerator for RandomMazeGenerator {
    fn generate(self, config: MazeConfig) -> Result<MazeLayout> {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        maze_layout(config, self.wall_probability, self.max_attempts, &mut rng)
    }
}
