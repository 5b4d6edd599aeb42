//! Live game registry and matchmaking.
//!
//! Lock order is queue, then sessions. Neither lock is held across an await,
//! and notifications go out only after both are released.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chess_core::Coordinate;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::account::{Account, RatingStore};
use crate::config::Config;
use crate::error::RefereeError;
use crate::notify::{GameEvent, Notifier};
use crate::presence::Presence;
use crate::queue::MatchQueue;
use crate::session::actor::{self, Command};
use crate::session::{GameSession, SessionId, SessionSnapshot};

/// Result of a successful `join_queue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Waiting; zero-based place in line.
    Queued { position: usize },
    /// Paired immediately into a new game.
    Matched { session_id: SessionId },
    /// Accepted, then pruned because the player has no live connection.
    Disconnected,
}

#[derive(Debug, Clone)]
struct SessionEntry {
    inbox: mpsc::UnboundedSender<Command>,
    white: String,
    black: String,
}

#[derive(Debug, Default)]
struct SessionIndex {
    by_id: HashMap<SessionId, SessionEntry>,
    by_player: HashMap<String, SessionId>,
}

/// State shared between the registry and its session actors.
pub(crate) struct Shared {
    sessions: RwLock<SessionIndex>,
    notifier: Arc<dyn Notifier>,
    ratings: Arc<dyn RatingStore>,
    presence: Arc<dyn Presence>,
    config: Config,
}

impl Shared {
    fn read(&self) -> RwLockReadGuard<'_, SessionIndex> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionIndex> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    fn inbox(&self, id: SessionId) -> Option<mpsc::UnboundedSender<Command>> {
        self.read().by_id.get(&id).map(|entry| entry.inbox.clone())
    }

    fn session_for(&self, username: &str) -> Option<SessionId> {
        self.read().by_player.get(username).copied()
    }

    fn insert(&self, id: SessionId, entry: SessionEntry) {
        let mut index = self.write();
        index.by_player.insert(entry.white.clone(), id);
        index.by_player.insert(entry.black.clone(), id);
        index.by_id.insert(id, entry);
    }

    pub(crate) fn contains(&self, id: SessionId) -> bool {
        self.read().by_id.contains_key(&id)
    }

    /// Drop a finished session. Returns false if it was already gone.
    pub(crate) fn remove(&self, id: SessionId) -> bool {
        let mut index = self.write();
        let Some(entry) = index.by_id.remove(&id) else {
            return false;
        };
        for username in [&entry.white, &entry.black] {
            if index.by_player.get(username) == Some(&id) {
                index.by_player.remove(username);
            }
        }
        true
    }

    pub(crate) fn persist_rating(&self, username: &str, rating: i32) {
        self.ratings.persist_rating(username, rating);
    }

    pub(crate) fn notify_players(&self, snapshot: &SessionSnapshot, event: GameEvent) {
        self.notifier.notify(&snapshot.white_account.username, event, snapshot);
        self.notifier.notify(&snapshot.black_account.username, event, snapshot);
    }
}

/// Explicitly constructed registry of queued players and live sessions.
/// Create one at startup; [`GameRegistry::shutdown`] runs on drop if it was
/// not called before.
///
/// Methods that start games spawn Tokio tasks and must run inside a runtime.
pub struct GameRegistry {
    shared: Arc<Shared>,
    queue: Mutex<MatchQueue>,
}

impl GameRegistry {
    pub fn new(
        config: Config,
        notifier: Arc<dyn Notifier>,
        ratings: Arc<dyn RatingStore>,
        presence: Arc<dyn Presence>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                sessions: RwLock::new(SessionIndex::default()),
                notifier,
                ratings,
                presence,
                config,
            }),
            queue: Mutex::new(MatchQueue::new()),
        }
    }

    pub fn config(&self) -> &Config {
        self.shared.config()
    }

    fn queue(&self) -> MutexGuard<'_, MatchQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueue an account, prune disconnected players, then pair the two
    /// oldest entries for as long as at least two are waiting.
    pub fn join_queue(&self, account: Account) -> Result<JoinOutcome, RefereeError> {
        let username = account.username.clone();
        let mut queue = self.queue();

        if queue.contains(&username) {
            return Err(RefereeError::AlreadyQueued(format!("{username} is already waiting")));
        }
        if let Some(id) = self.shared.session_for(&username) {
            return Err(RefereeError::AlreadyInGame(format!("{username} is playing game {id}")));
        }

        queue.push(account);
        debug!(username = %username, queued = queue.len(), "joined queue");

        let pruned = queue.prune(|name| self.shared.presence.is_connected(name));
        for account in &pruned {
            debug!(username = %account.username, "pruned disconnected player from queue");
        }

        let mut matched = None;
        let mut started = Vec::new();
        while let Some((white, black)) = queue.pop_pair() {
            let involved = white.username == username || black.username == username;
            let (id, snapshot) = self.spawn_session(white, black);
            if involved {
                matched = Some(id);
            }
            started.push(snapshot);
        }
        let position = queue.position(&username);
        drop(queue);

        for snapshot in &started {
            self.shared.notify_players(snapshot, GameEvent::GameStart);
        }

        Ok(match (matched, position) {
            (Some(session_id), _) => JoinOutcome::Matched { session_id },
            (None, Some(position)) => JoinOutcome::Queued { position },
            (None, None) => JoinOutcome::Disconnected,
        })
    }

    pub fn leave_queue(&self, username: &str) -> Result<Account, RefereeError> {
        let account = self
            .queue()
            .remove(username)
            .ok_or_else(|| RefereeError::NotFound(format!("{username} is not in the queue")))?;
        debug!(username = %username, "left queue");
        Ok(account)
    }

    pub fn queue_len(&self) -> usize {
        self.queue().len()
    }

    pub fn is_queued(&self, username: &str) -> bool {
        self.queue().contains(username)
    }

    /// Start a game directly, bypassing pairing. Both players leave the
    /// queue if they were waiting.
    pub fn start_game(&self, white: Account, black: Account) -> Result<SessionId, RefereeError> {
        if white.username == black.username {
            return Err(RefereeError::AlreadyInGame(format!(
                "{} cannot play against themselves",
                white.username
            )));
        }

        let mut queue = self.queue();
        for username in [&white.username, &black.username] {
            if let Some(id) = self.shared.session_for(username) {
                return Err(RefereeError::AlreadyInGame(format!("{username} is playing game {id}")));
            }
        }
        queue.remove(&white.username);
        queue.remove(&black.username);

        let (id, snapshot) = self.spawn_session(white, black);
        drop(queue);

        self.shared.notify_players(&snapshot, GameEvent::GameStart);
        Ok(id)
    }

    /// Seed clocks, register the session and hand it to its actor.
    fn spawn_session(&self, white: Account, black: Account) -> (SessionId, SessionSnapshot) {
        let id = SessionId::new();
        let session = GameSession::new(id, white, black, self.shared.config.clock_budget);
        let snapshot = session.snapshot();

        let (tx, rx) = mpsc::unbounded_channel();
        self.shared.insert(
            id,
            SessionEntry {
                inbox: tx,
                white: session.white().username.clone(),
                black: session.black().username.clone(),
            },
        );
        info!(
            session_id = %id,
            white = %session.white().username,
            black = %session.black().username,
            "game started"
        );
        tokio::spawn(actor::run(session, rx, Arc::clone(&self.shared)));
        (id, snapshot)
    }

    async fn request<T>(
        &self,
        id: SessionId,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, RefereeError> {
        let not_found = || RefereeError::NotFound(format!("no live game {id}"));
        let inbox = self.shared.inbox(id).ok_or_else(not_found)?;
        let (reply, response) = oneshot::channel();
        inbox.send(command(reply)).map_err(|_| not_found())?;
        response.await.map_err(|_| {
            warn!(session_id = %id, "session actor dropped a request");
            not_found()
        })
    }

    pub async fn move_piece(
        &self,
        id: SessionId,
        account: &Account,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<SessionSnapshot, RefereeError> {
        let username = account.username.clone();
        self.request(id, |reply| Command::Move {
            username,
            origin,
            destination,
            reply,
        })
        .await?
    }

    pub async fn resign(
        &self,
        id: SessionId,
        account: &Account,
    ) -> Result<SessionSnapshot, RefereeError> {
        let username = account.username.clone();
        self.request(id, |reply| Command::Resign { username, reply }).await?
    }

    pub async fn get_session(&self, id: SessionId) -> Result<SessionSnapshot, RefereeError> {
        self.request(id, |reply| Command::Snapshot { reply }).await
    }

    /// Id of the live game `username` is playing, if any.
    pub fn find_session_for(&self, username: &str) -> Option<SessionId> {
        self.shared.session_for(username)
    }

    pub async fn active_session_for(&self, username: &str) -> Option<SessionSnapshot> {
        let id = self.find_session_for(username)?;
        self.get_session(id).await.ok()
    }

    pub fn session_count(&self) -> usize {
        self.shared.read().by_id.len()
    }

    /// Drop every queued account and stop every session actor. Running games
    /// end without settlement.
    pub fn shutdown(&self) {
        let queued = self.queue().drain().len();
        let stopped = {
            let mut index = self.shared.write();
            index.by_player.clear();
            index.by_id.drain().count()
        };
        if queued + stopped > 0 {
            info!(queued, stopped, "registry shut down");
        }
    }
}

impl Drop for GameRegistry {
    fn drop(&mut self) {
        self.shutdown();
    }
}
