//! One match: players, board, clocks and the game state machine.
//!
//! `GameSession` itself is synchronous and single-owner. Concurrent access
//! goes through the per-session actor in [`actor`], which serializes moves,
//! resignations and timeout firings.

pub(crate) mod actor;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chess_core::{Board, Color, Coordinate, MoveEffect, Square};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use crate::account::Account;
use crate::error::RefereeError;
use crate::rating::{self, Settlement};

/// Unique identifier for a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameState {
    WhiteToMove,
    BlackToMove,
    WhiteWinByMate,
    BlackWinByMate,
    WhiteWinByTime,
    BlackWinByTime,
    WhiteWinByResignation,
    BlackWinByResignation,
    Stalemate,
    /// No transition produces this state yet.
    Draw,
}

impl GameState {
    pub const fn to_move(color: Color) -> Self {
        match color {
            Color::White => GameState::WhiteToMove,
            Color::Black => GameState::BlackToMove,
        }
    }

    pub const fn win_by_mate(winner: Color) -> Self {
        match winner {
            Color::White => GameState::WhiteWinByMate,
            Color::Black => GameState::BlackWinByMate,
        }
    }

    pub const fn win_by_time(winner: Color) -> Self {
        match winner {
            Color::White => GameState::WhiteWinByTime,
            Color::Black => GameState::BlackWinByTime,
        }
    }

    pub const fn win_by_resignation(winner: Color) -> Self {
        match winner {
            Color::White => GameState::WhiteWinByResignation,
            Color::Black => GameState::BlackWinByResignation,
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, GameState::WhiteToMove | GameState::BlackToMove)
    }

    pub const fn side_to_move(self) -> Option<Color> {
        match self {
            GameState::WhiteToMove => Some(Color::White),
            GameState::BlackToMove => Some(Color::Black),
            _ => None,
        }
    }

    pub const fn winner(self) -> Option<Color> {
        match self {
            GameState::WhiteWinByMate
            | GameState::WhiteWinByTime
            | GameState::WhiteWinByResignation => Some(Color::White),
            GameState::BlackWinByMate
            | GameState::BlackWinByTime
            | GameState::BlackWinByResignation => Some(Color::Black),
            _ => None,
        }
    }

    /// White's score for settlement: 1, 0 or 0.5. `None` while in progress.
    pub fn white_score(self) -> Option<f64> {
        if !self.is_terminal() {
            return None;
        }
        Some(match self.winner() {
            Some(Color::White) => 1.0,
            Some(Color::Black) => 0.0,
            None => 0.5,
        })
    }
}

/// One accepted move, as recorded in the session history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayedMove {
    pub color: Color,
    pub origin: Square,
    pub destination: Square,
    pub effect: MoveEffect,
    pub elapsed_ms: u64,
}

/// Full public view of a session; this is the notification payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub white_account: Account,
    pub black_account: Account,
    pub board: Board,
    pub white_time_remaining_ms: u64,
    pub black_time_remaining_ms: u64,
    pub state: GameState,
    pub state_entered_at: DateTime<Utc>,
    pub moves: Vec<PlayedMove>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_rating_change: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub black_rating_change: Option<i32>,
}

#[derive(Debug)]
pub struct GameSession {
    id: SessionId,
    white: Account,
    black: Account,
    board: Board,
    white_time_remaining: Duration,
    black_time_remaining: Duration,
    state: GameState,
    state_entered_at: DateTime<Utc>,
    /// Monotonic twin of `state_entered_at`, used for clock arithmetic.
    state_entered: Instant,
    moves: Vec<PlayedMove>,
    settlement: Option<Settlement>,
}

impl GameSession {
    pub fn new(id: SessionId, white: Account, black: Account, clock_budget: Duration) -> Self {
        Self {
            id,
            white,
            black,
            board: Board::new(),
            white_time_remaining: clock_budget,
            black_time_remaining: clock_budget,
            state: GameState::WhiteToMove,
            state_entered_at: Utc::now(),
            state_entered: Instant::now(),
            moves: Vec::new(),
            settlement: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn white(&self) -> &Account {
        &self.white
    }

    pub fn black(&self) -> &Account {
        &self.black
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn moves(&self) -> &[PlayedMove] {
        &self.moves
    }

    pub fn settlement(&self) -> Option<Settlement> {
        self.settlement
    }

    pub fn time_remaining(&self, color: Color) -> Duration {
        match color {
            Color::White => self.white_time_remaining,
            Color::Black => self.black_time_remaining,
        }
    }

    fn time_remaining_mut(&mut self, color: Color) -> &mut Duration {
        match color {
            Color::White => &mut self.white_time_remaining,
            Color::Black => &mut self.black_time_remaining,
        }
    }

    /// Which side `username` plays, if either.
    pub fn color_of(&self, username: &str) -> Option<Color> {
        if self.white.username == username {
            Some(Color::White)
        } else if self.black.username == username {
            Some(Color::Black)
        } else {
            None
        }
    }

    fn player_color(&self, username: &str) -> Result<Color, RefereeError> {
        self.color_of(username).ok_or_else(|| {
            RefereeError::Unauthorized(format!("{username} is not playing in this game"))
        })
    }

    /// When the side on move runs out of time. `None` once the game is over.
    pub fn deadline(&self) -> Option<Instant> {
        let side = self.state.side_to_move()?;
        Some(self.state_entered + self.time_remaining(side))
    }

    fn enter_state(&mut self, state: GameState) {
        self.state = state;
        self.state_entered_at = Utc::now();
        self.state_entered = Instant::now();
    }

    /// Authorize and apply one move. On error nothing changes.
    pub fn apply_move(
        &mut self,
        username: &str,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<MoveEffect, RefereeError> {
        let color = self.player_color(username)?;

        if self.state.is_terminal() {
            return Err(RefereeError::Unauthorized("game is already over".into()));
        }
        if self.state != GameState::to_move(color) {
            return Err(RefereeError::Unauthorized(format!("it is not {color}'s turn")));
        }

        let elapsed = self.state_entered.elapsed();
        let remaining = self.time_remaining(color);
        if elapsed > remaining {
            return Err(RefereeError::Unauthorized(format!("{color}'s clock is exhausted")));
        }

        let origin = Square::try_from(origin)?;
        let destination = Square::try_from(destination)?;
        match self.board.piece_at(origin) {
            Some(piece) if piece.color() == color => {}
            Some(_) => {
                return Err(RefereeError::Unauthorized(format!(
                    "the piece on {origin} does not belong to {color}"
                )))
            }
            None => return Err(RefereeError::IllegalMove(format!("no piece on {origin}"))),
        }

        let effect = self.board.move_piece(origin, destination, true)?;

        *self.time_remaining_mut(color) = remaining - elapsed;
        self.moves.push(PlayedMove {
            color,
            origin,
            destination,
            effect,
            elapsed_ms: elapsed.as_millis() as u64,
        });

        let opponent = color.opposite();
        let next = if self.board.is_checkmate(opponent) {
            GameState::win_by_mate(color)
        } else if !self.board.has_any_legal_move(opponent) {
            GameState::Stalemate
        } else {
            GameState::to_move(opponent)
        };
        self.enter_state(next);
        Ok(effect)
    }

    /// Concede the game. Resigning on one's own turn also spends the time
    /// used so far.
    pub fn resign(&mut self, username: &str) -> Result<GameState, RefereeError> {
        let color = self.player_color(username)?;
        if self.state.is_terminal() {
            return Err(RefereeError::Unauthorized("game is already over".into()));
        }

        if self.state == GameState::to_move(color) {
            let elapsed = self.state_entered.elapsed();
            let remaining = self.time_remaining_mut(color);
            *remaining = remaining.saturating_sub(elapsed);
        }
        self.enter_state(GameState::win_by_resignation(color.opposite()));
        Ok(self.state)
    }

    /// Timeout firing. Flags the side on move if its clock has run out;
    /// a no-op otherwise, including on a game that is already over.
    pub fn expire(&mut self) -> Option<GameState> {
        let side = self.state.side_to_move()?;
        if self.state_entered.elapsed() < self.time_remaining(side) {
            return None;
        }
        *self.time_remaining_mut(side) = Duration::ZERO;
        self.enter_state(GameState::win_by_time(side.opposite()));
        Some(self.state)
    }

    /// Settle ratings once the game is over. Returns `None` while in progress
    /// and on every call after the first.
    pub fn settle(&mut self, k_factor: f64, floor: i32) -> Option<Settlement> {
        if self.settlement.is_some() {
            return None;
        }
        let settlement = rating::settle(&self.white, &self.black, self.state, k_factor, floor)?;
        self.white.elo_rating = settlement.white_rating;
        self.black.elo_rating = settlement.black_rating;
        self.settlement = Some(settlement);
        Some(settlement)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            white_account: self.white.clone(),
            black_account: self.black.clone(),
            board: self.board.clone(),
            white_time_remaining_ms: self.white_time_remaining.as_millis() as u64,
            black_time_remaining_ms: self.black_time_remaining.as_millis() as u64,
            state: self.state,
            state_entered_at: self.state_entered_at,
            moves: self.moves.clone(),
            white_rating_change: self.settlement.map(|s| s.white_change),
            black_rating_change: self.settlement.map(|s| s.black_change),
        }
    }
}
