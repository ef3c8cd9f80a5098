use thiserror::Error;

/// Reasons a move is rejected. Display text is sent to clients as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameRuleError {
    #[error("Column {0} does not exist.")]
    InvalidColumn(i64),
    #[error("Column {0} is full.")]
    ColumnFull(usize),
    #[error("The game is over.")]
    GameOver,
    #[error("It isn't your turn.")]
    NotYourTurn,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("Move {index} was rejected: {source}")]
    Rejected { index: usize, source: GameRuleError },
    #[error("Move {index} landed on row {actual}, history says row {recorded}")]
    RowMismatch { index: usize, recorded: usize, actual: usize },
}
