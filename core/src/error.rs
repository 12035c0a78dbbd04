use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Coordinates are outside the board")]
    OutOfBounds,
    #[error("No maze satisfied the layout constraints after {attempts} attempts")]
    MazeUnsatisfiable { attempts: u32 },
    #[error("Invalid maze layout: {0}")]
    InvalidLayout(&'static str),
    #[error("Unknown difficulty")]
    UnknownDifficulty,
    #[error("Invalid game configuration")]
    InvalidConfig,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("No game has been started")]
    NoActiveGame,
    #[error("Action is not available in the current game mode")]
    WrongMode,
}

pub type Result<T> = core::result::Result<T, GameError>;
