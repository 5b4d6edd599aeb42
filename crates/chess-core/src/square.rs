//! Board coordinates and piece colors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank direction this color's pawns advance in.
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Rank (1-8) pawns of this color start on and may double-advance from.
    pub const fn pawn_rank(self) -> u8 {
        match self {
            Color::White => 2,
            Color::Black => 7,
        }
    }

    /// Rank (1-8) on which a pawn of this color promotes.
    pub const fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 8,
            Color::Black => 1,
        }
    }

    pub const fn back_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 8,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// A raw `{rank, file}` pair as supplied by callers. May lie off the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub rank: u8,
    pub file: char,
}

impl Coordinate {
    pub const fn new(rank: u8, file: char) -> Self {
        Self { rank, file }
    }

    /// Bounds check against ranks 1-8 and files A-H (either case).
    pub fn is_on_board(&self) -> bool {
        (1..=8).contains(&self.rank) && matches!(self.file.to_ascii_uppercase(), 'A'..='H')
    }
}

/// A validated on-board square. Stored as zero-based rank/file indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "Coordinate", try_from = "Coordinate")]
pub struct Square {
    rank: u8,
    file: u8,
}

impl Square {
    /// Build a square from zero-based indices, `None` when off the board.
    pub fn from_indices(rank: i8, file: i8) -> Option<Self> {
        if (0..8).contains(&rank) && (0..8).contains(&file) {
            Some(Self {
                rank: rank as u8,
                file: file as u8,
            })
        } else {
            None
        }
    }

    /// Caller guarantees both indices are below 8.
    pub(crate) const fn at(rank: usize, file: usize) -> Self {
        debug_assert!(rank < 8 && file < 8);
        Self {
            rank: rank as u8,
            file: file as u8,
        }
    }

    /// Build a square from a 1-based rank and a file letter.
    pub fn new(rank: u8, file: char) -> Option<Self> {
        Self::try_from(Coordinate::new(rank, file)).ok()
    }

    /// Rank in 1-8.
    pub const fn rank(self) -> u8 {
        self.rank + 1
    }

    /// File letter in A-H.
    pub const fn file(self) -> char {
        (b'A' + self.file) as char
    }

    pub(crate) const fn rank_index(self) -> usize {
        self.rank as usize
    }

    pub(crate) const fn file_index(self) -> usize {
        self.file as usize
    }

    /// The square `d_rank` ranks and `d_file` files away, if still on the board.
    pub fn offset(self, d_rank: i8, d_file: i8) -> Option<Self> {
        Self::from_indices(self.rank as i8 + d_rank, self.file as i8 + d_file)
    }

    pub fn coordinate(self) -> Coordinate {
        Coordinate::new(self.rank(), self.file())
    }

    /// All 64 squares, rank 1 first, A to H within a rank.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8).flat_map(|rank| (0..8).map(move |file| Square::at(rank, file)))
    }
}

impl TryFrom<Coordinate> for Square {
    type Error = ChessError;

    fn try_from(coord: Coordinate) -> Result<Self, Self::Error> {
        if !coord.is_on_board() {
            return Err(ChessError::InvalidSquare {
                rank: coord.rank,
                file: coord.file,
            });
        }
        let file = coord.file.to_ascii_uppercase() as u8 - b'A';
        Ok(Self {
            rank: coord.rank - 1,
            file,
        })
    }
}

impl From<Square> for Coordinate {
    fn from(square: Square) -> Self {
        square.coordinate()
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file().to_ascii_lowercase(), self.rank())
    }
}

/// Parses algebraic square names such as `e4`. Intended for tests and logs.
impl FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(ChessError::InvalidSquareName(s.to_string()));
        };
        let rank = rank
            .to_digit(10)
            .ok_or_else(|| ChessError::InvalidSquareName(s.to_string()))?;
        Square::new(rank as u8, file).ok_or_else(|| ChessError::InvalidSquareName(s.to_string()))
    }
}
