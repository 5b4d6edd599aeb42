//! Referee configuration from environment variables

use std::env;
use std::time::Duration;

const DEFAULT_CLOCK_BUDGET_SECS: u64 = 600;
const DEFAULT_RATING_K_FACTOR: f64 = 30.0;
const DEFAULT_RATING_FLOOR: i32 = 0;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Time each player starts the game with
    pub clock_budget: Duration,

    /// Elo K-factor applied at settlement
    pub rating_k_factor: f64,

    /// Lowest rating settlement can produce
    pub rating_floor: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clock_budget: Duration::from_secs(DEFAULT_CLOCK_BUDGET_SECS),
            rating_k_factor: DEFAULT_RATING_K_FACTOR,
            rating_floor: DEFAULT_RATING_FLOOR,
        }
    }
}

impl Config {
    /// Read configuration from the environment. Unset or unparsable values
    /// fall back to their defaults.
    pub fn from_env() -> Self {
        let clock_budget_secs = env::var("CLOCK_BUDGET_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CLOCK_BUDGET_SECS);

        let rating_k_factor = env::var("RATING_K_FACTOR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RATING_K_FACTOR);

        let rating_floor = env::var("RATING_FLOOR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RATING_FLOOR);

        Self {
            clock_budget: Duration::from_secs(clock_budget_secs),
            rating_k_factor,
            rating_floor,
        }
    }

    /// Load `.env` if present, then read the environment.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn with_clock_budget(mut self, clock_budget: Duration) -> Self {
        self.clock_budget = clock_budget;
        self
    }
}
