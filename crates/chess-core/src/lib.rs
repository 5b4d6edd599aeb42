//! Chess rules engine: board ownership, per-piece move generation, and
//! check/checkmate/stalemate detection.
//!
//! Castling is encoded as the king moving onto its own rook (or the rook onto
//! its king); `Board::move_piece` infers the side from the rook's file.

pub mod board;
pub mod error;
mod movegen;
pub mod piece;
pub mod square;

pub use board::{Board, MoveEffect, MoveSet};
pub use error::ChessError;
pub use piece::{Piece, PieceId, PieceKind};
pub use square::{Color, Coordinate, Square};
