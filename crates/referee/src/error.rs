//! Referee error types

use chess_core::ChessError;
use thiserror::Error;

/// Every rejection is synchronous and leaves the game untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefereeError {
    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already queued: {0}")]
    AlreadyQueued(String),

    #[error("Already in game: {0}")]
    AlreadyInGame(String),

    #[error("Invalid square: {0}")]
    InvalidSquare(String),
}

impl From<ChessError> for RefereeError {
    fn from(err: ChessError) -> Self {
        match err {
            ChessError::IllegalMove { .. } => RefereeError::IllegalMove(err.to_string()),
            ChessError::InvalidSquare { .. } | ChessError::InvalidSquareName(_) => {
                RefereeError::InvalidSquare(err.to_string())
            }
        }
    }
}
