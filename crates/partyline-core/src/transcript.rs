//! Append-only transcript of chat messages.
//!
//! The server records every message it relays so a session can be read
//! back later. Persistence is best effort: callers log append failures
//! and keep relaying.

use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Handle to the transcript file.
///
/// Cloning is cheap; each append opens the file fresh in append mode, so
/// clones never contend on a shared file handle.
#[derive(Debug, Clone)]
pub struct Transcript {
    path: PathBuf,
}

impl Transcript {
    /// Creates a transcript handle for the given path.
    ///
    /// The file is not touched until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path the transcript writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one message to the transcript, followed by a newline.
    ///
    /// The parent directory must already exist.
    pub async fn append(&self, text: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(text.as_bytes()).await?;
        file.write_all(b"\n").await?;
        debug!(path = %self.path.display(), bytes = text.len(), "Transcript appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_accumulates_lines() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = Transcript::new(dir.path().join("log.txt"));

        transcript.append("Linux: hello").await.unwrap();
        transcript.append("macOS: hi back").await.unwrap();

        let contents = tokio::fs::read_to_string(transcript.path()).await.unwrap();
        assert_eq!(contents, "Linux: hello\nmacOS: hi back\n");
    }

    #[tokio::test]
    async fn append_keeps_embedded_newlines_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = Transcript::new(dir.path().join("log.txt"));

        transcript.append("one\ntwo").await.unwrap();

        let contents = tokio::fs::read_to_string(transcript.path()).await.unwrap();
        assert_eq!(contents, "one\ntwo\n");
    }

    #[tokio::test]
    async fn append_fails_when_directory_missing() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = Transcript::new(dir.path().join("missing").join("log.txt"));

        assert!(transcript.append("lost").await.is_err());
    }
}
