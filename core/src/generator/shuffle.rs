use alloc::vec::Vec;
use ndarray::Array2;
use rand::prelude::*;
use rand::rngs::SmallRng;

use super::*;

/// Places exactly `min(config.mines, rows * cols)` mines by shuffling every
/// cell index and mining the first ones.
pub fn shuffled_layout<R: Rng + ?Sized>(config: GameConfig, rng: &mut R) -> MineLayout {
    let total_cells = usize::from(config.total_cells());
    let mines = usize::from(config.mines);

    if mines > total_cells {
        log::warn!(
            "Board already full, generated anyway, requested {} but only fits {}",
            mines,
            total_cells
        );
    }

    let mut indices: Vec<usize> = (0..total_cells).collect();
    indices.shuffle(rng);

    let cols = usize::from(config.cols());
    let mut mine_mask: Array2<bool> = Array2::default(config.size.to_nd_index());
    for &index in indices.iter().take(mines) {
        mine_mask[[index / cols, index % cols]] = true;
    }
    MineLayout::from_mine_mask(mine_mask)
}

/// Uniform mine placement from a fixed seed.
#[derive(Clone, Debug, PartialEq)]
pub struct ShuffledMineGenerator {
    seed: u64,
}

impl ShuffledMineGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MineLayoutGenerator for ShuffledMineGenerator {
    fn generate(self, config: GameConfig) -> MineLayout {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        shuffled_layout(config, &mut rng)
    }
}

/// Reshuffles until the starting cell is blank: no mine on it or around it.
///
/// Gives up after `max_attempts` boards and keeps the last one.
#[derive(Clone, Debug, PartialEq)]
pub struct SafeStartGenerator {
    seed: u64,
    start: Coord2,
    max_attempts: u32,
}

impl SafeStartGenerator {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

    pub fn new(seed: u64, start: Coord2) -> Self {
        Self {
            seed,
            start,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

impl MineLayoutGenerator for SafeStartGenerator {
    fn generate(self, config: GameConfig) -> MineLayout {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        safe_start_layout(config, self.start, self.max_attempts, &mut rng)
    }
}

pub fn safe_start_layout<R: Rng + ?Sized>(
    config: GameConfig,
    start: Coord2,
    max_attempts: u32,
    rng: &mut R,
) -> MineLayout {
    let mut layout = shuffled_layout(config, rng);
    if layout.validate_coords(start).is_err() {
        log::warn!("safe start {:?} is off the board, keeping a random board", start);
        return layout;
    }

    for attempt in 1..max_attempts {
        if is_blank(&layout, start) {
            log::debug!("blank start found after {} boards", attempt);
            return layout;
        }
        layout = shuffled_layout(config, rng);
    }

    if !is_blank(&layout, start) {
        log::warn!("no blank start after {} boards, keeping the last one", max_attempts);
    }
    layout
}

fn is_blank(layout: &MineLayout, coords: Coord2) -> bool {
    !layout.contains_mine(coords) && layout.adjacent_mine_count(coords) == 0
}
