//! FIFO match queue, deduplicated by username.

use std::collections::VecDeque;

use crate::account::Account;

#[derive(Debug, Default)]
pub struct MatchQueue {
    waiting: VecDeque<Account>,
}

impl MatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.position(username).is_some()
    }

    /// Zero-based place in line.
    pub fn position(&self, username: &str) -> Option<usize> {
        self.waiting.iter().position(|a| a.username == username)
    }

    /// Append to the back of the line. Returns false if the username is
    /// already waiting.
    pub fn push(&mut self, account: Account) -> bool {
        if self.contains(&account.username) {
            return false;
        }
        self.waiting.push_back(account);
        true
    }

    pub fn remove(&mut self, username: &str) -> Option<Account> {
        let index = self.position(username)?;
        self.waiting.remove(index)
    }

    /// Drop every account `is_live` rejects, returning them in queue order.
    pub fn prune(&mut self, is_live: impl Fn(&str) -> bool) -> Vec<Account> {
        let mut pruned = Vec::new();
        self.waiting.retain(|account| {
            let live = is_live(&account.username);
            if !live {
                pruned.push(account.clone());
            }
            live
        });
        pruned
    }

    /// Pop the two oldest entries; the first plays White.
    pub fn pop_pair(&mut self) -> Option<(Account, Account)> {
        if self.waiting.len() < 2 {
            return None;
        }
        let white = self.waiting.pop_front()?;
        let black = self.waiting.pop_front()?;
        Some((white, black))
    }

    pub fn drain(&mut self) -> Vec<Account> {
        self.waiting.drain(..).collect()
    }
}
