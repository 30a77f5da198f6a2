//! Fan-out of chat payloads to every connected peer.

use tracing::debug;

use crate::peer::Peer;
use crate::roster::Roster;

/// Relays payloads to everyone in the roster, pruning peers whose
/// sockets fail.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    roster: Roster,
}

impl Broadcaster {
    pub fn new(roster: Roster) -> Self {
        Self { roster }
    }

    /// Sends `payload` to every currently connected peer, the sender
    /// included.
    ///
    /// Works from a roster snapshot: peers joining mid-broadcast are not
    /// served this payload, and peers leaving mid-broadcast surface as
    /// write failures. Failed peers are shut down and removed before the
    /// call returns. Returns how many peers the payload reached.
    pub async fn broadcast(&self, payload: &[u8]) -> usize {
        let peers = self.roster.snapshot().await;
        let mut failed: Vec<Peer> = Vec::new();
        let mut delivered = 0;

        for peer in peers {
            match peer.send(payload).await {
                Ok(()) => delivered += 1,
                Err(error) => {
                    debug!(peer = %peer.id(), %error, "Dropping peer after failed write");
                    failed.push(peer);
                }
            }
        }

        for peer in failed {
            peer.shutdown().await;
            self.roster.remove(peer.id()).await;
        }

        delivered
    }
}
