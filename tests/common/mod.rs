#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use chess_core::{Coordinate, Square};
use referee::{
    Account, ChannelNotifier, Config, GameEvent, GameRegistry, Notification, Notifier, Presence,
    RatingStore, SessionSnapshot,
};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test subscriber once. Honors `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
            .with_test_writer()
            .try_init();
    });
}

pub fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

pub fn coord(name: &str) -> Coordinate {
    sq(name).coordinate()
}

/// Presence stub: every player is online.
pub struct AlwaysConnected;

impl Presence for AlwaysConnected {
    fn is_connected(&self, _username: &str) -> bool {
        true
    }
}

/// Rating sink that remembers every write.
#[derive(Default)]
pub struct RecordingRatings {
    writes: Mutex<Vec<(String, i32)>>,
}

impl RecordingRatings {
    pub fn writes(&self) -> Vec<(String, i32)> {
        self.writes.lock().unwrap().clone()
    }
}

impl RatingStore for RecordingRatings {
    fn persist_rating(&self, username: &str, rating: i32) {
        self.writes.lock().unwrap().push((username.to_string(), rating));
    }
}

/// Notifier that remembers every notification.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, GameEvent, SessionSnapshot)>>,
}

impl RecordingNotifier {
    pub fn events_for(&self, username: &str) -> Vec<GameEvent> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _, _)| name == username)
            .map(|(_, event, _)| *event)
            .collect()
    }

    pub fn count(&self, event: GameEvent) -> usize {
        self.sent.lock().unwrap().iter().filter(|(_, e, _)| *e == event).count()
    }

    pub fn last(&self) -> Option<SessionSnapshot> {
        self.sent.lock().unwrap().last().map(|(_, _, s)| s.clone())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, username: &str, event: GameEvent, payload: &SessionSnapshot) {
        self.sent
            .lock()
            .unwrap()
            .push((username.to_string(), event, payload.clone()));
    }
}

pub struct Harness {
    pub registry: GameRegistry,
    pub notifier: Arc<RecordingNotifier>,
    pub ratings: Arc<RecordingRatings>,
}

/// Registry wired to recording sinks, everyone online.
pub fn harness(clock_budget: Duration) -> Harness {
    init_tracing();
    let notifier = Arc::new(RecordingNotifier::default());
    let ratings = Arc::new(RecordingRatings::default());
    let registry = GameRegistry::new(
        Config::default().with_clock_budget(clock_budget),
        notifier.clone(),
        ratings.clone(),
        Arc::new(AlwaysConnected),
    );
    Harness {
        registry,
        notifier,
        ratings,
    }
}

/// Registry whose notifications arrive on a channel.
pub fn channel_harness(
    clock_budget: Duration,
) -> (GameRegistry, mpsc::UnboundedReceiver<Notification>, Arc<RecordingRatings>) {
    init_tracing();
    let (notifier, rx) = ChannelNotifier::new();
    let ratings = Arc::new(RecordingRatings::default());
    let registry = GameRegistry::new(
        Config::default().with_clock_budget(clock_budget),
        Arc::new(notifier),
        ratings.clone(),
        Arc::new(AlwaysConnected),
    );
    (registry, rx, ratings)
}

pub fn account(name: &str) -> Account {
    Account::new(name, 1200)
}
