//! Connect-time greeting played to a freshly accepted peer.
//!
//! The greeting is decoration in front of the relay: a banner line, a
//! short progress animation, and a ready line, all written before the
//! peer joins the roster. The relay core never depends on it; swap in
//! [`Greeting::Silent`] to admit peers with no preamble at all.

use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Banner written as soon as the connection is accepted.
pub const LINK_BANNER: &str = "Remote Link Established, Connecting Now\n";

/// Line written once the progress animation completes.
pub const READY_LINE: &str = "\nConnection ready.\n";

const BAR_WIDTH: usize = 6;

/// What a peer sees between `accept` and joining the chat.
#[derive(Debug, Clone)]
pub enum Greeting {
    /// Banner, animated progress bar, ready line.
    Progress(ProgressGreeting),
    /// No greeting bytes at all.
    Silent,
}

impl Default for Greeting {
    fn default() -> Self {
        Greeting::Progress(ProgressGreeting::default())
    }
}

impl Greeting {
    /// Plays the greeting into `writer`.
    ///
    /// Entirely best effort: write failures are logged and swallowed,
    /// and the peer is admitted either way.
    pub async fn play<W>(&self, writer: &mut W)
    where
        W: AsyncWrite + Unpin,
    {
        match self {
            Greeting::Progress(progress) => progress.play(writer).await,
            Greeting::Silent => {}
        }
    }
}

/// Progress-bar greeting: `steps` frames spread evenly over `duration`.
#[derive(Debug, Clone)]
pub struct ProgressGreeting {
    steps: usize,
    duration: Duration,
}

impl Default for ProgressGreeting {
    fn default() -> Self {
        Self {
            steps: 20,
            duration: Duration::from_secs(2),
        }
    }
}

impl ProgressGreeting {
    pub fn new(steps: usize, duration: Duration) -> Self {
        Self {
            steps: steps.max(1),
            duration,
        }
    }

    /// Length in bytes of the full greeting, banner and ready line
    /// included. Useful for draining the preamble off a stream.
    pub fn wire_len(&self) -> usize {
        LINK_BANNER.len() + self.steps * (BAR_WIDTH + 3) + READY_LINE.len()
    }

    async fn play<W>(&self, writer: &mut W)
    where
        W: AsyncWrite + Unpin,
    {
        if let Err(error) = writer.write_all(LINK_BANNER.as_bytes()).await {
            debug!(%error, "Greeting dropped at banner");
            return;
        }
        let pause = self.duration / self.steps as u32;
        for step in 0..self.steps {
            // A dropped frame keeps the pacing; the ready line may still
            // get through.
            let frame = progress_frame(step, self.steps);
            if let Err(error) = writer.write_all(frame.as_bytes()).await {
                debug!(%error, "Greeting frame dropped");
            }
            tokio::time::sleep(pause).await;
        }
        if let Err(error) = writer.write_all(READY_LINE.as_bytes()).await {
            debug!(%error, "Greeting dropped at ready line");
        }
    }
}

/// Renders one carriage-return-terminated progress frame.
///
/// The bar fills left to right but never reaches full width on the last
/// frame; the ready line lands before it would.
pub fn progress_frame(step: usize, steps: usize) -> String {
    let fill = "=".repeat(step * BAR_WIDTH / steps);
    format!("[{fill:<width$}]\r", width = BAR_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_frame_fills_left_to_right() {
        assert_eq!(progress_frame(0, 20), "[      ]\r");
        assert_eq!(progress_frame(10, 20), "[===   ]\r");
        assert_eq!(progress_frame(19, 20), "[===== ]\r");
    }

    #[tokio::test(start_paused = true)]
    async fn progress_greeting_writes_exact_sequence() {
        let greeting = Greeting::Progress(ProgressGreeting::new(4, Duration::from_millis(400)));
        let mut wire: Vec<u8> = Vec::new();

        greeting.play(&mut wire).await;

        let mut expected = String::from(LINK_BANNER);
        expected.push_str("[      ]\r");
        expected.push_str("[=     ]\r");
        expected.push_str("[===   ]\r");
        expected.push_str("[====  ]\r");
        expected.push_str(READY_LINE);
        assert_eq!(wire, expected.as_bytes());
    }

    #[tokio::test(start_paused = true)]
    async fn default_greeting_is_twenty_frames_over_two_seconds() {
        let mut wire: Vec<u8> = Vec::new();
        let started = tokio::time::Instant::now();

        Greeting::default().play(&mut wire).await;

        let mut expected = String::from(LINK_BANNER);
        for step in 0..20 {
            expected.push_str(&progress_frame(step, 20));
        }
        expected.push_str(READY_LINE);
        assert_eq!(wire, expected.as_bytes());
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn silent_greeting_writes_nothing() {
        let mut wire: Vec<u8> = Vec::new();
        Greeting::Silent.play(&mut wire).await;
        assert!(wire.is_empty());
    }

    #[test]
    fn wire_len_matches_played_bytes() {
        let greeting = ProgressGreeting::new(4, Duration::from_millis(1));
        let expected = LINK_BANNER.len() + 4 * 9 + READY_LINE.len();
        assert_eq!(greeting.wire_len(), expected);
    }
}
