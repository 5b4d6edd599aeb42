//! Per-piece move generation.
//!
//! Generation is two-phase: geometry first (`pseudo_legal`), then a
//! check-safety filter that plays each candidate on a cloned board and drops
//! it if the mover's own king is left in check. The filter simulates one
//! level only; the king-in-check test on the clone uses geometry alone.

use crate::board::Board;
use crate::piece::PieceKind;
use crate::square::{Color, Square};

const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ALL_DIRECTIONS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (1, 2),
    (1, -2),
    (-2, 1),
    (-2, -1),
    (-1, 2),
    (-1, -2),
];
/// Castling partners always share the king's rank.
const ALONG_RANK: [(i8, i8); 2] = [(0, 1), (0, -1)];

/// Geometry-only destinations of the piece on `origin`.
///
/// `check_safe` only matters for castling: when set, castling pseudo-moves
/// are withheld while the mover's king is in check.
pub(crate) fn pseudo_legal(board: &Board, origin: Square, check_safe: bool) -> Vec<Square> {
    let Some(piece) = board.piece_at(origin) else {
        return Vec::new();
    };
    let color = piece.color();

    match piece.kind() {
        PieceKind::Pawn => pawn_moves(board, origin, color),
        PieceKind::Knight => step_moves(board, origin, color, &KNIGHT_OFFSETS),
        PieceKind::Bishop => slide_moves(board, origin, color, &DIAGONAL),
        PieceKind::Queen => slide_moves(board, origin, color, &ALL_DIRECTIONS),
        PieceKind::Rook { has_moved } => {
            let mut moves = slide_moves(board, origin, color, &ORTHOGONAL);
            if !has_moved {
                moves.extend(castling_partners(board, origin, color, check_safe, |kind| {
                    kind == PieceKind::KING
                }));
            }
            moves
        }
        PieceKind::King { has_moved } => {
            let mut moves = step_moves(board, origin, color, &ALL_DIRECTIONS);
            if !has_moved {
                moves.extend(castling_partners(board, origin, color, check_safe, |kind| {
                    kind == PieceKind::ROOK
                }));
            }
            moves
        }
        PieceKind::PassingPawnMarker => Vec::new(),
    }
}

/// Pseudo-legal destinations that do not leave the mover's king in check.
pub(crate) fn legal(board: &Board, origin: Square) -> Vec<Square> {
    let Some(piece) = board.piece_at(origin) else {
        return Vec::new();
    };

    pseudo_legal(board, origin, true)
        .into_iter()
        .filter(|destination| {
            let mut trial = board.clone();
            trial.move_piece(origin, *destination, false).is_ok()
                && !trial.is_king_in_check(piece.color())
        })
        .collect()
}

fn pawn_moves(board: &Board, origin: Square, color: Color) -> Vec<Square> {
    let mut moves = Vec::new();
    let forward = color.forward();

    if let Some(one) = origin.offset(forward, 0) {
        if board.piece_at(one).is_none() {
            moves.push(one);
            if origin.rank() == color.pawn_rank() {
                if let Some(two) = origin.offset(2 * forward, 0) {
                    if board.piece_at(two).is_none() {
                        moves.push(two);
                    }
                }
            }
        }
    }

    for side in [-1, 1] {
        let Some(target) = origin.offset(forward, side) else {
            continue;
        };
        match board.piece_at(target) {
            Some(occupant) if occupant.color() != color => moves.push(target),
            Some(_) => {}
            None => {
                // En passant: the square holds an opposing marker.
                let marker = board
                    .entry_at(target)
                    .is_some_and(|entry| entry.is_marker() && entry.color() != color);
                if marker {
                    moves.push(target);
                }
            }
        }
    }

    moves
}

fn step_moves(board: &Board, origin: Square, color: Color, offsets: &[(i8, i8)]) -> Vec<Square> {
    offsets
        .iter()
        .filter_map(|(d_rank, d_file)| origin.offset(*d_rank, *d_file))
        .filter(|target| board.piece_at(*target).map_or(true, |p| p.color() != color))
        .collect()
}

fn slide_moves(
    board: &Board,
    origin: Square,
    color: Color,
    directions: &[(i8, i8)],
) -> Vec<Square> {
    let mut moves = Vec::new();
    for (d_rank, d_file) in directions {
        let mut cursor = origin.offset(*d_rank, *d_file);
        while let Some(target) = cursor {
            match board.piece_at(target) {
                Some(blocker) => {
                    if blocker.color() != color {
                        moves.push(target);
                    }
                    break;
                }
                None => moves.push(target),
            }
            cursor = target.offset(*d_rank, *d_file);
        }
    }
    moves
}

/// Squares of unmoved same-color partners reachable along the rank with a
/// clear path. Moving onto the partner encodes castling.
fn castling_partners(
    board: &Board,
    origin: Square,
    color: Color,
    check_safe: bool,
    is_partner: impl Fn(PieceKind) -> bool,
) -> Vec<Square> {
    let mut partners = Vec::new();
    for (d_rank, d_file) in ALONG_RANK {
        let mut cursor = origin.offset(d_rank, d_file);
        while let Some(target) = cursor {
            if let Some(blocker) = board.piece_at(target) {
                if blocker.color() == color && is_partner(blocker.kind()) {
                    partners.push(target);
                }
                break;
            }
            cursor = target.offset(d_rank, d_file);
        }
    }

    if !partners.is_empty() && check_safe && board.is_king_in_check(color) {
        partners.clear();
    }
    partners
}
