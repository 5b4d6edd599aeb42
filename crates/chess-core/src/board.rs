//! The 8x8 board: piece placement, the single mutation entry point and the
//! check/mate/stalemate queries built on top of move generation.

use serde::Serialize;

use crate::error::ChessError;
use crate::movegen;
use crate::piece::{Piece, PieceId, PieceKind};
use crate::square::{Color, Coordinate, Square};

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::ROOK,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::KING,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::ROOK,
];

/// Which of the mutually exclusive move effects `Board::move_piece` applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MoveEffect {
    Castle { kingside: bool },
    DoublePawnAdvance,
    EnPassant,
    Normal { capture: bool, promotion: bool },
}

/// Every check-safe destination of the piece standing on `origin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveSet {
    pub origin: Square,
    pub destinations: Vec<Square>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    /// Indexed `[rank][file]`, rank 1 first.
    squares: [[Option<Piece>; 8]; 8],
    #[serde(skip)]
    next_id: u16,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Standard initial position.
    pub fn new() -> Self {
        let mut board = Self::empty();
        for color in [Color::White, Color::Black] {
            let back = color.back_rank();
            for (file, kind) in BACK_RANK.iter().enumerate() {
                board.put(Square::at(back as usize - 1, file), color, *kind);
            }
            let pawns = color.pawn_rank();
            for file in 0..8 {
                board.put(Square::at(pawns as usize - 1, file), color, PieceKind::Pawn);
            }
        }
        board
    }

    /// A board with no pieces, for building arbitrary positions with `place`.
    pub fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
            next_id: 0,
        }
    }

    /// Put a fresh piece on `square`, replacing whatever stood there.
    pub fn place(&mut self, square: Square, color: Color, kind: PieceKind) -> PieceId {
        self.put(square, color, kind)
    }

    fn put(&mut self, square: Square, color: Color, kind: PieceKind) -> PieceId {
        let id = PieceId::new(self.next_id);
        self.next_id += 1;
        self.set(square, Some(Piece::new(id, color, kind)));
        id
    }

    fn set(&mut self, square: Square, entry: Option<Piece>) {
        self.squares[square.rank_index()][square.file_index()] = entry;
    }

    /// Occupant of `square`. PassingPawnMarkers are not occupants and read as empty.
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.entry_at(square).filter(|piece| !piece.is_marker())
    }

    /// Raw square contents, PassingPawnMarkers included.
    pub fn entry_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.rank_index()][square.file_index()]
    }

    /// Occupant at a raw coordinate; off-board input reads as empty.
    pub fn piece_at_coordinate(&self, coord: Coordinate) -> Option<Piece> {
        Square::try_from(coord)
            .ok()
            .and_then(|square| self.piece_at(square))
    }

    pub fn is_position_valid(coord: Coordinate) -> bool {
        coord.is_on_board()
    }

    /// Where the piece with this identity stands, by linear scan.
    pub fn position_of(&self, id: PieceId) -> Option<Square> {
        Square::all().find(|square| self.piece_at(*square).is_some_and(|p| p.id() == id))
    }

    /// All real pieces of one color with their squares.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |square| {
            self.piece_at(square)
                .filter(|piece| piece.color() == color)
                .map(|piece| (square, piece))
        })
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(color)
            .find(|(_, piece)| piece.is_king())
            .map(|(square, _)| square)
    }

    /// Geometry-only destinations, ignoring whether the mover's king ends up in check.
    pub fn pseudo_legal_moves(&self, origin: Square) -> Vec<Square> {
        movegen::pseudo_legal(self, origin, false)
    }

    /// Check-safe destinations of the piece on `origin`.
    pub fn legal_moves(&self, origin: Square) -> Vec<Square> {
        movegen::legal(self, origin)
    }

    /// Check-safe options for every piece of `color`, including pieces with none.
    pub fn move_options(&self, color: Color) -> Vec<MoveSet> {
        self.pieces(color)
            .map(|(origin, _)| MoveSet {
                origin,
                destinations: self.legal_moves(origin),
            })
            .collect()
    }

    /// True iff any opposing piece's pseudo-legal moves reach this color's king.
    pub fn is_king_in_check(&self, color: Color) -> bool {
        let Some(king) = self.king_square(color) else {
            return false;
        };
        self.pieces(color.opposite())
            .any(|(square, _)| movegen::pseudo_legal(self, square, false).contains(&king))
    }

    pub fn has_any_legal_move(&self, color: Color) -> bool {
        self.pieces(color)
            .any(|(square, _)| !self.legal_moves(square).is_empty())
    }

    pub fn is_checkmate(&self, color: Color) -> bool {
        self.is_king_in_check(color) && !self.has_any_legal_move(color)
    }

    pub fn is_stalemate(&self, color: Color) -> bool {
        !self.is_king_in_check(color) && !self.has_any_legal_move(color)
    }

    /// The only way to mutate a board during play.
    ///
    /// With `enforce_legality` the destination must be among the piece's
    /// check-safe moves. Nothing is mutated when an error is returned.
    pub fn move_piece(
        &mut self,
        origin: Square,
        destination: Square,
        enforce_legality: bool,
    ) -> Result<MoveEffect, ChessError> {
        let mover = self
            .piece_at(origin)
            .ok_or_else(|| ChessError::illegal(origin, destination, "origin square is empty"))?;

        if enforce_legality && !self.legal_moves(origin).contains(&destination) {
            return Err(ChessError::illegal(
                origin,
                destination,
                "destination is not a legal move for this piece",
            ));
        }

        let target = self.piece_at(destination);
        let mut laid_marker = None;

        let effect = if target.is_some_and(|t| t.color() == mover.color()) {
            self.castle(origin, destination)?
        } else if mover.is_pawn()
            && origin.file() == destination.file()
            && (destination.rank() as i8 - origin.rank() as i8).abs() == 2
        {
            let skipped = Square::at(
                (origin.rank_index() + destination.rank_index()) / 2,
                origin.file_index(),
            );
            self.set(origin, None);
            self.set(destination, Some(mover));
            self.set(skipped, Some(mover.marker()));
            laid_marker = Some(skipped);
            MoveEffect::DoublePawnAdvance
        } else if mover.is_pawn() && target.is_none() && origin.file() != destination.file() {
            if let Some(captured) = destination.offset(-mover.color().forward(), 0) {
                self.set(captured, None);
            }
            self.set(origin, None);
            self.set(destination, Some(mover));
            MoveEffect::EnPassant
        } else {
            let promotion =
                mover.is_pawn() && destination.rank() == mover.color().promotion_rank();
            let placed = if promotion {
                mover.promoted()
            } else {
                mover.after_move()
            };
            self.set(origin, None);
            self.set(destination, Some(placed));
            MoveEffect::Normal {
                capture: target.is_some(),
                promotion,
            }
        };

        self.clear_markers(laid_marker);
        Ok(effect)
    }

    /// King and rook of one color swap into castled position.
    fn castle(&mut self, origin: Square, destination: Square) -> Result<MoveEffect, ChessError> {
        let (Some(a), Some(b)) = (self.piece_at(origin), self.piece_at(destination)) else {
            return Err(ChessError::illegal(
                origin,
                destination,
                "castling needs a king and a rook",
            ));
        };
        let (king_square, king, rook) = match (a.is_king(), b.is_king()) {
            (true, false) if b.is_rook() => (origin, a, b),
            (false, true) if a.is_rook() => (destination, b, a),
            _ => {
                return Err(ChessError::illegal(
                    origin,
                    destination,
                    "cannot capture a piece of the same color",
                ))
            }
        };
        let rook_square = if king_square == origin { destination } else { origin };

        let kingside = rook_square.file_index() > king_square.file_index();
        let (king_file, rook_file) = if kingside { (6, 5) } else { (2, 3) };
        let rank = king_square.rank_index();

        self.set(origin, None);
        self.set(destination, None);
        self.set(Square::at(rank, king_file), Some(king.after_move()));
        self.set(Square::at(rank, rook_file), Some(rook.after_move()));
        Ok(MoveEffect::Castle { kingside })
    }

    /// Drop every PassingPawnMarker except one laid by the move just made.
    fn clear_markers(&mut self, keep: Option<Square>) {
        for square in Square::all() {
            if Some(square) != keep && self.entry_at(square).is_some_and(|e| e.is_marker()) {
                self.set(square, None);
            }
        }
    }
}
