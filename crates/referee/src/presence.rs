//! Live-connection bookkeeping used to prune the match queue.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

/// Whether a player currently has at least one live connection.
pub trait Presence: Send + Sync {
    fn is_connected(&self, username: &str) -> bool;
}

/// In-memory map: username → open connection ids.
#[derive(Debug, Default)]
pub struct ConnectionTracker {
    connections: RwLock<HashMap<String, HashSet<String>>>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an open connection. Returns false if it was already known.
    pub fn register(&self, username: &str, connection_id: &str) -> bool {
        let mut connections = self.connections.write().unwrap_or_else(PoisonError::into_inner);
        connections
            .entry(username.to_string())
            .or_default()
            .insert(connection_id.to_string())
    }

    /// Forget a closed connection. Returns false if it was unknown.
    pub fn remove(&self, username: &str, connection_id: &str) -> bool {
        let mut connections = self.connections.write().unwrap_or_else(PoisonError::into_inner);
        let Some(ids) = connections.get_mut(username) else {
            return false;
        };
        let removed = ids.remove(connection_id);
        if ids.is_empty() {
            connections.remove(username);
        }
        removed
    }

    pub fn connection_count(&self, username: &str) -> usize {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(username)
            .map_or(0, HashSet::len)
    }
}

impl Presence for ConnectionTracker {
    fn is_connected(&self, username: &str) -> bool {
        self.connection_count(username) > 0
    }
}
