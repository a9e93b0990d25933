//! Identity-to-connection registry and message fan-out.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::warn;

use hexhold_protocol::Message;

/// Registry of connected peers keyed by identity. Sends go through each
/// peer's writer channel; a failed send drops only that peer, never the
/// rest of the fan-out.
#[derive(Default)]
pub struct Broadcaster {
    peers: HashMap<String, mpsc::UnboundedSender<Message>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer. Returns false (and keeps the existing entry) when
    /// the identity is already taken.
    pub fn register(&mut self, id: String, sender: mpsc::UnboundedSender<Message>) -> bool {
        if self.peers.contains_key(&id) {
            return false;
        }
        self.peers.insert(id, sender);
        true
    }

    pub fn deregister(&mut self, id: &str) {
        self.peers.remove(id);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.peers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn broadcast(&mut self, message: &Message) {
        self.broadcast_where(message, |_| true);
    }

    pub fn broadcast_excluding(&mut self, message: &Message, excluded: &str) {
        self.broadcast_where(message, |id| id != excluded);
    }

    pub fn broadcast_to(&mut self, message: &Message, target: &str) {
        self.broadcast_where(message, |id| id == target);
    }

    /// Fan out to every peer whose identity satisfies the predicate.
    pub fn broadcast_where(&mut self, message: &Message, predicate: impl Fn(&str) -> bool) {
        let mut dead = Vec::new();
        for (id, sender) in &self.peers {
            if !predicate(id) {
                continue;
            }
            if sender.send(message.clone()).is_err() {
                warn!("send to {:?} failed, dropping peer", id);
                dead.push(id.clone());
            }
        }
        for id in dead {
            self.peers.remove(&id);
        }
    }
}
