use thiserror::Error;

use crate::square::Square;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    #[error("Illegal move {origin} -> {destination}: {reason}")]
    IllegalMove {
        origin: Square,
        destination: Square,
        reason: &'static str,
    },

    #[error("Square is off the board: rank {rank}, file {file}")]
    InvalidSquare { rank: u8, file: char },

    #[error("Invalid square name: {0}")]
    InvalidSquareName(String),
}

impl ChessError {
    pub(crate) fn illegal(origin: Square, destination: Square, reason: &'static str) -> Self {
        ChessError::IllegalMove {
            origin,
            destination,
            reason,
        }
    }
}
