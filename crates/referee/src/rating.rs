//! Elo rating settlement.

use serde::Serialize;

use crate::account::Account;
use crate::session::GameState;

/// Expected score of a player against an opponent.
pub fn expected_score(rating: i32, opponent_rating: i32) -> f64 {
    1.0 / (1.0 + 10_f64.powf((opponent_rating - rating) as f64 / 400.0))
}

/// Rating after one game. `actual_score` is 1.0 for a win, 0.5 for a draw,
/// 0.0 for a loss. Rounded down, never below `floor`.
pub fn new_rating(
    rating: i32,
    opponent_rating: i32,
    actual_score: f64,
    k_factor: f64,
    floor: i32,
) -> i32 {
    let expected = expected_score(rating, opponent_rating);
    let updated = (rating as f64 + k_factor * (actual_score - expected)).floor() as i32;
    updated.max(floor)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub white_rating: i32,
    pub black_rating: i32,
    pub white_change: i32,
    pub black_change: i32,
}

/// Settle a finished game. `None` while the game is still in progress.
pub fn settle(
    white: &Account,
    black: &Account,
    state: GameState,
    k_factor: f64,
    floor: i32,
) -> Option<Settlement> {
    let white_score = state.white_score()?;
    let black_score = 1.0 - white_score;

    let white_rating = new_rating(white.elo_rating, black.elo_rating, white_score, k_factor, floor);
    let black_rating = new_rating(black.elo_rating, white.elo_rating, black_score, k_factor, floor);

    Some(Settlement {
        white_rating,
        black_rating,
        white_change: white_rating - white.elo_rating,
        black_change: black_rating - black.elo_rating,
    })
}
