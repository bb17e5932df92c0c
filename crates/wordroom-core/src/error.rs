/// Board geometry and placement failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("cell ({row}, {col}) is already occupied")]
    Overlap { row: usize, col: usize },
    #[error("cell ({row}, {col}) is off the board")]
    OutOfBounds { row: i64, col: i64 },
    #[error("tiles do not form a single contiguous line")]
    NonContiguous,
    #[error("play does not touch any tile on the board")]
    NotConnected,
    #[error("first play must cover the start square")]
    MissesStart,
    #[error("no tiles placed")]
    Empty,
}

/// Reasons a server message is rejected by the reducer. State is never
/// modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReduceError {
    #[error("malformed event: {0}")]
    Malformed(String),
    #[error("unknown player {0:?}")]
    UnknownPlayer(String),
    #[error("event for game {got:?}, session is on {expected:?}")]
    WrongGame { expected: String, got: String },
    #[error("event for turn {got}, log has {expected} turns")]
    Desync { expected: usize, got: usize },
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Local move-building failures, shown inline and fully recoverable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OverlayError {
    #[error("cell ({row}, {col}) is occupied")]
    CellOccupied { row: usize, col: usize },
    #[error("cell ({row}, {col}) is off the board")]
    OutOfBounds { row: usize, col: usize },
    #[error("letter {0:?} is not on the rack")]
    NotOnRack(char),
    #[error("tiles cannot be placed while examining history")]
    Examining,
    #[error("not your turn")]
    NotOnTurn,
    #[error("a blank has not been given a letter")]
    UndesignatedBlank,
    #[error("machine letter {0} is not in this alphabet")]
    UnknownLetter(u8),
    #[error(transparent)]
    NotLegal(#[from] BoardError),
}

/// Meta-event (abort / adjudication) request failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetaError {
    #[error("request {0:?} is already pending")]
    RequestPending(String),
    #[error("no active request")]
    NoActiveRequest,
    #[error("only the receiving player can answer a request")]
    NotReceiver,
}

/// Everything a session entry point can fail with.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Reduce(#[from] ReduceError),
    #[error(transparent)]
    Overlay(#[from] OverlayError),
    #[error(transparent)]
    Meta(#[from] MetaError),
    #[error("decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}
