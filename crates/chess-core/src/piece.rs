//! Piece variants.
//!
//! A piece is a closed tagged variant plus a per-game identity. Two pieces of
//! the same kind and color compare unequal when their ids differ, which is what
//! `Board::position_of` relies on.

use serde::{Deserialize, Serialize};

use crate::square::Color;

/// Stable per-game identity of a piece, allocated by the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(u16);

impl PieceId {
    pub(crate) const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "camelCase")]
pub enum PieceKind {
    Pawn,
    #[serde(rename_all = "camelCase")]
    Rook { has_moved: bool },
    Knight,
    Bishop,
    Queen,
    #[serde(rename_all = "camelCase")]
    King { has_moved: bool },
    /// Left on the square a pawn skipped over by a double advance.
    /// Only visible to en-passant lookups.
    PassingPawnMarker,
}

impl PieceKind {
    pub const ROOK: PieceKind = PieceKind::Rook { has_moved: false };
    pub const KING: PieceKind = PieceKind::King { has_moved: false };

    /// The same kind with its castling flag spent.
    const fn moved(self) -> Self {
        match self {
            PieceKind::Rook { .. } => PieceKind::Rook { has_moved: true },
            PieceKind::King { .. } => PieceKind::King { has_moved: true },
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    id: PieceId,
    color: Color,
    kind: PieceKind,
}

impl Piece {
    pub(crate) const fn new(id: PieceId, color: Color, kind: PieceKind) -> Self {
        Self { id, color, kind }
    }

    pub const fn id(&self) -> PieceId {
        self.id
    }

    pub const fn color(&self) -> Color {
        self.color
    }

    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    pub const fn is_marker(&self) -> bool {
        matches!(self.kind, PieceKind::PassingPawnMarker)
    }

    pub const fn is_pawn(&self) -> bool {
        matches!(self.kind, PieceKind::Pawn)
    }

    pub const fn is_king(&self) -> bool {
        matches!(self.kind, PieceKind::King { .. })
    }

    pub const fn is_rook(&self) -> bool {
        matches!(self.kind, PieceKind::Rook { .. })
    }

    /// Whether this piece has spent its castling right. Always false for
    /// kinds that never castle.
    pub const fn has_moved(&self) -> bool {
        matches!(
            self.kind,
            PieceKind::Rook { has_moved: true } | PieceKind::King { has_moved: true }
        )
    }

    pub(crate) const fn after_move(self) -> Self {
        Self {
            kind: self.kind.moved(),
            ..self
        }
    }

    pub(crate) const fn promoted(self) -> Self {
        Self {
            kind: PieceKind::Queen,
            ..self
        }
    }

    pub(crate) const fn marker(self) -> Self {
        Self {
            kind: PieceKind::PassingPawnMarker,
            ..self
        }
    }
}
