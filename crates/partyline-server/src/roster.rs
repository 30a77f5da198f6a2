//! Registry of connected peers.
//!
//! The roster is the only shared mutable state in the server, and all
//! access goes through its methods. `snapshot` copies the peer list out
//! under the read lock, so callers iterate with the lock released and a
//! slow peer never blocks registration.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::RwLock;
use tracing::debug;

use crate::peer::{Peer, PeerId};

/// Shared registry of connected peers. Cloning shares the same registry.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    peers: Arc<RwLock<HashMap<PeerId, Peer>>>,
    next_id: Arc<AtomicU64>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new peer and returns its handle.
    pub async fn add(&self, addr: SocketAddr, writer: OwnedWriteHalf) -> Peer {
        let id = PeerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let peer = Peer::new(id, addr, writer);
        self.peers.write().await.insert(id, peer.clone());
        debug!(peer = %id, addr = %addr, "Peer registered");
        peer
    }

    /// Removes a peer, returning whether it was still present.
    ///
    /// Both the session task and the broadcaster may try to remove the
    /// same peer; whichever loses the race gets `false` back.
    pub async fn remove(&self, id: PeerId) -> bool {
        let removed = self.peers.write().await.remove(&id).is_some();
        if removed {
            debug!(peer = %id, "Peer removed");
        }
        removed
    }

    /// Returns a point-in-time copy of the connected peers.
    pub async fn snapshot(&self) -> Vec<Peer> {
        self.peers.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }
}
