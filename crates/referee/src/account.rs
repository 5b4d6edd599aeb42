//! Player identity and the rating persistence sink.

use serde::{Deserialize, Serialize};

/// Read-only identity handed in by the account service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub username: String,
    pub elo_rating: i32,
}

impl Account {
    pub fn new(username: impl Into<String>, elo_rating: i32) -> Self {
        Self {
            username: username.into(),
            elo_rating,
        }
    }
}

/// Durable write of a settled rating. Fire-and-forget: the referee never
/// waits on or retries it.
pub trait RatingStore: Send + Sync {
    fn persist_rating(&self, username: &str, rating: i32);
}
