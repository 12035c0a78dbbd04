use crate::*;
pub use rejection::*;
pub use shuffle::*;

mod rejection;
mod shuffle;

pub trait MineLayoutGenerator {
    fn generate(self, config: GameConfig) -> MineLayout;
}

pub trait MazeLayoutGenerator {
    fn generate(self, config: MazeConfig) -> Result<MazeLayout>;
}
