//! Best-effort push of game events to players.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use crate::session::SessionSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEvent {
    #[serde(rename = "games:gameStart")]
    GameStart,
    #[serde(rename = "games:gameUpdate")]
    GameUpdate,
    #[serde(rename = "games:gameOver")]
    GameOver,
}

impl GameEvent {
    pub const fn as_str(self) -> &'static str {
        match self {
            GameEvent::GameStart => "games:gameStart",
            GameEvent::GameUpdate => "games:gameUpdate",
            GameEvent::GameOver => "games:gameOver",
        }
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification sink. Called outside every registry lock and never awaited,
/// so implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, username: &str, event: GameEvent, payload: &SessionSnapshot);
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub username: String,
    pub event: GameEvent,
    pub payload: SessionSnapshot,
}

/// Forwards every notification over an unbounded channel, for a transport
/// layer (or a test) to drain.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, username: &str, event: GameEvent, payload: &SessionSnapshot) {
        let notification = Notification {
            username: username.to_string(),
            event,
            payload: payload.clone(),
        };
        if self.tx.send(notification).is_err() {
            debug!(username, %event, "notification receiver dropped");
        }
    }
}
