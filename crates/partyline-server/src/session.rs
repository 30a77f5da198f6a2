//! Per-peer relay session.
//!
//! One session task owns the read half of a peer's socket. It reads raw
//! chunks of at most [`READ_CHUNK_SIZE`] bytes, prints and records each
//! one, and hands the untouched bytes to the broadcaster. There is no
//! framing: a chunk may hold part of a message or several messages
//! stuck together, and it is relayed exactly as it arrived.

use std::str;

use partyline_core::{Transcript, READ_CHUNK_SIZE};
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::net::tcp::OwnedReadHalf;
use tracing::{info, warn};

use crate::broadcast::Broadcaster;
use crate::peer::Peer;
use crate::roster::Roster;

/// Task state for one connected peer.
pub struct PeerSession {
    peer: Peer,
    reader: OwnedReadHalf,
    roster: Roster,
    broadcaster: Broadcaster,
    transcript: Transcript,
}

impl PeerSession {
    pub fn new(
        peer: Peer,
        reader: OwnedReadHalf,
        roster: Roster,
        broadcaster: Broadcaster,
        transcript: Transcript,
    ) -> Self {
        Self {
            peer,
            reader,
            roster,
            broadcaster,
            transcript,
        }
    }

    /// Runs the session until the peer disconnects or misbehaves.
    ///
    /// However the session ends, the peer has left the roster by the
    /// time this returns.
    pub async fn run(mut self) {
        println!("client from {} joined", self.peer.addr());
        info!(peer = %self.peer.id(), addr = %self.peer.addr(), "Peer joined");

        if let Err(error) = self.relay_loop().await {
            warn!(peer = %self.peer.id(), %error, "Session ended with error");
        }

        self.roster.remove(self.peer.id()).await;
        info!(peer = %self.peer.id(), "Peer left");
    }

    async fn relay_loop(&mut self) -> Result<(), SessionError> {
        let mut buf = [0u8; READ_CHUNK_SIZE];
        loop {
            let n = self.reader.read(&mut buf).await?;
            if n == 0 {
                return Ok(());
            }
            let chunk = &buf[..n];
            // A chunk that does not decode ends the session before the
            // bytes reach anyone.
            let text = str::from_utf8(chunk)?;
            println!("{text}");
            if let Err(error) = self.transcript.append(text).await {
                warn!(path = %self.transcript.path().display(), %error, "Failed to write message to file");
            }
            self.broadcaster.broadcast(chunk).await;
        }
    }
}

/// Why a relay session stopped, beyond a clean disconnect.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("socket read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("peer sent invalid UTF-8: {0}")]
    Decode(#[from] str::Utf8Error),
}
