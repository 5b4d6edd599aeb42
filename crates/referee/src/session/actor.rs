//! Per-session actor. Owns one `GameSession` and applies moves, resignations
//! and clock expiry one at a time, so a timeout and a late move can never both
//! transition the same state.

use std::sync::Arc;

use chess_core::Coordinate;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::{GameSession, SessionId, SessionSnapshot};
use crate::error::RefereeError;
use crate::notify::GameEvent;
use crate::registry::Shared;

pub(crate) type Reply<T> = oneshot::Sender<Result<T, RefereeError>>;

#[derive(Debug)]
pub(crate) enum Command {
    Move {
        username: String,
        origin: Coordinate,
        destination: Coordinate,
        reply: Reply<SessionSnapshot>,
    },
    Resign {
        username: String,
        reply: Reply<SessionSnapshot>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

/// Drive a session until it ends or every handle to it is dropped.
///
/// The timeout is re-armed from the session's deadline on every iteration,
/// which cancels the previous one.
pub(crate) async fn run(
    mut session: GameSession,
    mut inbox: mpsc::UnboundedReceiver<Command>,
    shared: Arc<Shared>,
) {
    let session_id = session.id();

    while let Some(deadline) = session.deadline() {
        let command = tokio::select! {
            biased;
            _ = tokio::time::sleep_until(deadline) => {
                if let Some(state) = session.expire() {
                    info!(session_id = %session_id, ?state, "clock expired");
                    conclude(&mut session, &shared);
                }
                continue;
            }
            command = inbox.recv() => command,
        };

        let Some(command) = command else {
            debug!(session_id = %session_id, "session handles dropped, stopping");
            return;
        };

        match command {
            Command::Move {
                username,
                origin,
                destination,
                reply,
            } => {
                let result = session
                    .apply_move(&username, origin, destination)
                    .map(|effect| {
                        debug!(
                            session_id = %session_id,
                            username = %username,
                            ?effect,
                            state = ?session.state(),
                            "move accepted"
                        );
                        if session.state().is_terminal() {
                            conclude(&mut session, &shared);
                        } else {
                            shared.notify_players(&session.snapshot(), GameEvent::GameUpdate);
                        }
                        session.snapshot()
                    });
                if let Err(e) = &result {
                    debug!(session_id = %session_id, username = %username, "move rejected: {e}");
                }
                send(reply, result, session_id);
            }
            Command::Resign { username, reply } => {
                let result = session.resign(&username).map(|state| {
                    info!(
                        session_id = %session_id,
                        username = %username,
                        ?state,
                        "player resigned"
                    );
                    conclude(&mut session, &shared);
                    session.snapshot()
                });
                send(reply, result, session_id);
            }
            Command::Snapshot { reply } => {
                if reply.send(session.snapshot()).is_err() {
                    warn!(session_id = %session_id, "snapshot requester went away");
                }
            }
        }
    }

    // Terminal: commands still queued behind the final transition see a
    // finished game.
    inbox.close();
    while let Ok(command) = inbox.try_recv() {
        warn!(session_id = %session_id, "command arrived for a finished session");
        let over = || RefereeError::NotFound(format!("game {session_id} is over"));
        match command {
            Command::Move { reply, .. } | Command::Resign { reply, .. } => {
                let _ = reply.send(Err(over()));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(session.snapshot());
            }
        }
    }
}

/// Terminal transition: settle, persist both ratings, leave the registry,
/// then tell both players. Sessions already stopped by a shutdown end
/// silently.
fn conclude(session: &mut GameSession, shared: &Shared) {
    if !shared.contains(session.id()) {
        debug!(session_id = %session.id(), "registry shut down, skipping settlement");
        return;
    }
    let config = shared.config();
    if let Some(settlement) = session.settle(config.rating_k_factor, config.rating_floor) {
        shared.persist_rating(&session.white().username, settlement.white_rating);
        shared.persist_rating(&session.black().username, settlement.black_rating);
        info!(
            session_id = %session.id(),
            state = ?session.state(),
            white_change = settlement.white_change,
            black_change = settlement.black_change,
            "game concluded"
        );
    }
    shared.remove(session.id());
    shared.notify_players(&session.snapshot(), GameEvent::GameOver);
}

fn send<T>(reply: Reply<T>, result: Result<T, RefereeError>, session_id: SessionId) {
    if reply.send(result).is_err() {
        warn!(session_id = %session_id, "reply channel closed before response");
    }
}
