//! TCP chat client.
//!
//! Connects to a partyline host, prints every relayed chunk between
//! dashed separators, and sends the operator's lines tagged with the
//! client's label. The wire is raw UTF-8 with no framing in either
//! direction.

pub mod client;
pub mod error;

// Re-exports for convenience
pub use client::{frame_chunk, ChatClient, ClientConfig};
pub use error::{ClientError, Result};

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Runs the chat client until the operator quits or the connection
/// fails.
///
/// Ctrl-C leaves the chat the same way typing `exit` does.
pub async fn run(config: ClientConfig) -> Result<()> {
    let cancel_token = CancellationToken::new();
    let interrupt_token = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received, leaving the chat");
            interrupt_token.cancel();
        }
    });

    ChatClient::new(config, cancel_token).run().await
}
