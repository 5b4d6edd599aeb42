//! Match referee: pairs queued players, runs each game as a serialized
//! session actor with per-player clocks, and settles Elo ratings when a game
//! reaches a terminal state.
//!
//! Collaborators (notification push, rating persistence, connection presence)
//! are injected as trait objects into [`GameRegistry::new`].

pub mod account;
pub mod config;
pub mod error;
pub mod notify;
pub mod presence;
pub mod queue;
pub mod rating;
pub mod registry;
pub mod session;

pub use account::{Account, RatingStore};
pub use config::Config;
pub use error::RefereeError;
pub use notify::{ChannelNotifier, GameEvent, Notification, Notifier};
pub use presence::{ConnectionTracker, Presence};
pub use queue::MatchQueue;
pub use rating::Settlement;
pub use registry::{GameRegistry, JoinOutcome};
pub use session::{GameSession, GameState, PlayedMove, SessionId, SessionSnapshot};
