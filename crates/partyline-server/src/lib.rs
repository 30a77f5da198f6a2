//! TCP chat host.
//!
//! Accepts peers, greets them, and relays every received chunk to every
//! connected peer, the sender included. Chunks are raw UTF-8 with no
//! framing, and every relayed chunk is appended to the transcript file.
//!
//! ```text
//!   operator stdin --> HostInput ----+
//!                                    v
//!   peer socket ----> PeerSession -> Broadcaster -> each Peer in Roster
//!        ^                      \
//!        |                       +-> Transcript
//!   accept loop (greeting, then Roster::add)
//! ```

pub mod broadcast;
pub mod greeting;
pub mod host_input;
pub mod peer;
pub mod roster;
pub mod server;
pub mod session;

// Re-exports for convenience
pub use broadcast::Broadcaster;
pub use greeting::{Greeting, ProgressGreeting};
pub use host_input::HostInput;
pub use peer::{Peer, PeerId};
pub use roster::Roster;
pub use server::{ChatServer, ServerConfig, ServerError};
pub use session::PeerSession;

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Runs the chat host until its accept loop stops.
///
/// Ctrl-C ends the operator input feed but leaves the accept loop
/// running, so remote peers keep chatting after the host's stdin is
/// done. Stopping the process after that takes a harder signal.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let cancel_token = CancellationToken::new();
    let server = ChatServer::bind(config, cancel_token.clone())?;

    let input_token = CancellationToken::new();
    let interrupt_token = input_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received, closing host input");
            interrupt_token.cancel();
        }
    });

    let host_input = HostInput::new(
        server.host_label().to_string(),
        server.broadcaster().clone(),
        server.transcript().clone(),
        input_token,
    );
    tokio::spawn(host_input.run());

    let result = server.run().await;
    cancel_token.cancel();
    result
}
