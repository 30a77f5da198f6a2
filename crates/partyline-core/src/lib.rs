//! Shared primitives for the partyline chat tool.
//!
//! This crate holds the small pieces both the server and the client need:
//!
//! - Wire and port defaults shared by both binaries
//! - Identity labels derived from the host platform
//! - The append-only transcript file the server keeps

pub mod identity;
pub mod transcript;

// Re-exports for convenience
pub use identity::{os_label, tag_line};
pub use transcript::Transcript;

/// Port the server listens on and the client dials by default.
pub const DEFAULT_PORT: u16 = 12345;

/// Default path of the transcript file, relative to the server's working
/// directory.
pub const DEFAULT_TRANSCRIPT: &str = "chat_messages.txt";

/// Largest chunk a single socket read may return.
///
/// Messages are not framed, so a read can carry a partial message or
/// several coalesced ones. Receivers must treat each chunk as opaque text.
pub const READ_CHUNK_SIZE: usize = 1024;
