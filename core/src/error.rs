use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Swapped cells must be orthogonally adjacent")]
    NotAdjacent,
    #[error("At least one gem kind is required")]
    EmptyKindSet,
    #[error("Allowed gem kinds must be ordinary kinds")]
    InvalidKind,
    #[error("Invalid rules: {0}")]
    InvalidRules(&'static str),
    #[error("Unrecognized board cell {0:?}")]
    InvalidCell(char),
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Board has not been initialized")]
    NotInitialized,
    #[error("Previous swap has not been resolved yet")]
    ResolutionPending,
    #[error("Action playback still in progress")]
    PlaybackInProgress,
    #[error("Time is up, no new moves are accepted")]
    TimeUp,
}

pub type Result<T> = core::result::Result<T, GameError>;
