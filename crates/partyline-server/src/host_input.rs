//! Operator input feed.
//!
//! Lines typed into the server's terminal enter the chat like any peer
//! chunk: tagged with the host's label, recorded, broadcast. The feed is
//! its own task, so the listener keeps accepting peers after stdin
//! closes or the operator interrupts.

use partyline_core::{tag_line, Transcript};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::broadcast::Broadcaster;

/// Reads operator lines from stdin and feeds them into the chat.
pub struct HostInput {
    label: String,
    broadcaster: Broadcaster,
    transcript: Transcript,
    cancel_token: CancellationToken,
}

impl HostInput {
    pub fn new(
        label: String,
        broadcaster: Broadcaster,
        transcript: Transcript,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            label,
            broadcaster,
            transcript,
            cancel_token,
        }
    }

    /// Runs until stdin reaches EOF, a read fails, or the token fires.
    pub async fn run(self) {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    debug!("Host input interrupted");
                    break;
                }
                line = lines.next_line() => match line {
                    Ok(Some(line)) => self.feed_line(&line).await,
                    Ok(None) => {
                        debug!("Host input closed");
                        break;
                    }
                    Err(error) => {
                        warn!(%error, "Host input read failed");
                        break;
                    }
                },
            }
        }
    }

    /// Tags, records, and broadcasts one operator line.
    ///
    /// Empty lines are dropped. Transcript failures are quiet here; the
    /// operator's own terminal is not the place for per-line write
    /// errors.
    pub async fn feed_line(&self, line: &str) {
        if line.is_empty() {
            return;
        }
        let message = tag_line(&self.label, line);
        if let Err(error) = self.transcript.append(&message).await {
            debug!(path = %self.transcript.path().display(), %error, "Transcript append failed");
        }
        self.broadcaster.broadcast(message.as_bytes()).await;
    }
}
