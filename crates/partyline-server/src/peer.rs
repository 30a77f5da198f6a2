//! Per-peer connection state.
//!
//! An accepted TCP connection is split in two: the read half is owned by
//! the peer's session task, and the write half lives here behind a mutex
//! so the broadcaster and the host input feed can both write to it.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

/// Write half of a peer socket, shared across tasks.
pub type PeerWriter = Arc<Mutex<OwnedWriteHalf>>;

/// Identifier assigned to a peer for the lifetime of its connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(pub u64);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer-{}", self.0)
    }
}

/// A connected peer: identifier, remote address, and guarded write half.
///
/// Cloning shares the underlying writer.
#[derive(Debug, Clone)]
pub struct Peer {
    id: PeerId,
    addr: SocketAddr,
    writer: PeerWriter,
}

impl Peer {
    pub(crate) fn new(id: PeerId, addr: SocketAddr, writer: OwnedWriteHalf) -> Self {
        Self {
            id,
            addr,
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    pub fn id(&self) -> PeerId {
        self.id
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Writes the whole payload to the peer's socket.
    pub async fn send(&self, payload: &[u8]) -> std::io::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(payload).await
    }

    /// Shuts down the write half. Failures are ignored; the peer may
    /// already be gone.
    pub async fn shutdown(&self) {
        let mut writer = self.writer.lock().await;
        let _ = writer.shutdown().await;
    }
}
