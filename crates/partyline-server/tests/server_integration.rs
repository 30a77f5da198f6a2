//! End-to-end tests for the chat host.
//!
//! These run a real server on an ephemeral local port and talk to it
//! over real TCP connections:
//! - Chunks are relayed to every peer, the sender included
//! - The greeting preamble arrives before any chat bytes
//! - Chunk boundaries neither add nor lose bytes
//! - The transcript records what was relayed

use std::path::PathBuf;
use std::time::Duration;

use partyline_server::greeting::{progress_frame, LINK_BANNER, READY_LINE};
use partyline_server::{ChatServer, Greeting, ProgressGreeting, Roster, ServerConfig, ServerError};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

// ============================================================================
// Constants
// ============================================================================

const WAIT_TIMEOUT: Duration = Duration::from_millis(500);
const POLL_INTERVAL: Duration = Duration::from_millis(10);
const READ_TIMEOUT: Duration = Duration::from_millis(500);

// ============================================================================
// Test Helpers
// ============================================================================

struct TestServer {
    port: u16,
    roster: Roster,
    transcript_path: PathBuf,
    cancel_token: CancellationToken,
    handle: tokio::task::JoinHandle<Result<(), ServerError>>,
    _temp_dir: TempDir,
}

impl TestServer {
    async fn start(greeting: Greeting) -> Self {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let transcript_path = temp_dir.path().join("chat_messages.txt");

        let config = ServerConfig {
            bind: "127.0.0.1".parse().unwrap(),
            port: 0,
            transcript_path: transcript_path.clone(),
            greeting,
            host_label: "Host".to_string(),
        };
        let cancel_token = CancellationToken::new();
        let server = ChatServer::bind(config, cancel_token.clone()).expect("bind server");
        let port = server.local_addr().expect("local addr").port();
        let roster = server.roster().clone();
        let handle = tokio::spawn(server.run());

        TestServer {
            port,
            roster,
            transcript_path,
            cancel_token,
            handle,
            _temp_dir: temp_dir,
        }
    }

    async fn connect(&self) -> TcpStream {
        TcpStream::connect(("127.0.0.1", self.port))
            .await
            .expect("connect to server")
    }

    async fn wait_for_peers(&self, count: usize) {
        let start = tokio::time::Instant::now();
        while self.roster.len().await != count {
            assert!(
                start.elapsed() < WAIT_TIMEOUT,
                "roster never reached {count} peers"
            );
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Polls the transcript until `predicate` accepts its contents.
    async fn wait_for_transcript(&self, predicate: impl Fn(&str) -> bool) -> String {
        let start = tokio::time::Instant::now();
        loop {
            let contents = tokio::fs::read_to_string(&self.transcript_path)
                .await
                .unwrap_or_default();
            if predicate(&contents) {
                return contents;
            }
            assert!(
                start.elapsed() < WAIT_TIMEOUT,
                "transcript never matched, last contents: {contents:?}"
            );
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn shutdown(self) {
        self.cancel_token.cancel();
        let _ = self.handle.await;
    }
}

async fn read_exactly(stream: &mut TcpStream, len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    timeout(READ_TIMEOUT, stream.read_exact(&mut buf))
        .await
        .expect("read timed out")
        .expect("read failed");
    buf
}

// ============================================================================
// Relay Tests
// ============================================================================

#[tokio::test]
async fn test_chunk_relayed_to_every_peer_including_sender() {
    let server = TestServer::start(Greeting::Silent).await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    server.wait_for_peers(2).await;

    alice.write_all(b"Linux: hello").await.unwrap();

    assert_eq!(read_exactly(&mut bob, 12).await, b"Linux: hello");
    assert_eq!(read_exactly(&mut alice, 12).await, b"Linux: hello");

    server.shutdown().await;
}

#[tokio::test]
async fn test_transcript_records_relayed_chunks() {
    let server = TestServer::start(Greeting::Silent).await;
    let mut alice = server.connect().await;
    server.wait_for_peers(1).await;

    alice.write_all(b"Linux: for the record").await.unwrap();

    let contents = server
        .wait_for_transcript(|c| c.contains("Linux: for the record"))
        .await;
    assert_eq!(contents, "Linux: for the record\n");

    server.shutdown().await;
}

#[tokio::test]
async fn test_disconnect_removes_peer_and_chat_goes_on() {
    let server = TestServer::start(Greeting::Silent).await;
    let alice = server.connect().await;
    let mut bob = server.connect().await;
    server.wait_for_peers(2).await;

    drop(alice);
    server.wait_for_peers(1).await;

    bob.write_all(b"still on the line").await.unwrap();
    assert_eq!(read_exactly(&mut bob, 17).await, b"still on the line");

    server.shutdown().await;
}

// ============================================================================
// Greeting Tests
// ============================================================================

#[tokio::test]
async fn test_greeting_preamble_precedes_chat() {
    let greeting = ProgressGreeting::new(3, Duration::from_millis(30));
    let preamble_len = greeting.wire_len();
    let server = TestServer::start(Greeting::Progress(greeting)).await;

    let mut alice = server.connect().await;
    let preamble = read_exactly(&mut alice, preamble_len).await;

    let mut expected = String::from(LINK_BANNER);
    expected.push_str(&progress_frame(0, 3));
    expected.push_str(&progress_frame(1, 3));
    expected.push_str(&progress_frame(2, 3));
    expected.push_str(READY_LINE);
    assert_eq!(preamble, expected.as_bytes());

    // Only after its own preamble does a peer see chat traffic.
    let mut bob = server.connect().await;
    read_exactly(&mut bob, preamble_len).await;
    server.wait_for_peers(2).await;

    bob.write_all(b"made it").await.unwrap();
    assert_eq!(read_exactly(&mut alice, 7).await, b"made it");

    server.shutdown().await;
}

// ============================================================================
// Chunk Boundary Tests
// ============================================================================

#[tokio::test]
async fn test_coalesced_write_is_relayed_verbatim() {
    let server = TestServer::start(Greeting::Silent).await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    server.wait_for_peers(2).await;

    // Two logical lines in one write: no separator is ever inserted.
    alice.write_all(b"one\ntwo").await.unwrap();

    assert_eq!(read_exactly(&mut bob, 7).await, b"one\ntwo");

    // One chunk, one append: the transcript shows both lines from a
    // single trailing newline.
    let contents = server.wait_for_transcript(|c| c.contains("two")).await;
    assert_eq!(contents, "one\ntwo\n");

    server.shutdown().await;
}

#[tokio::test]
async fn test_oversized_payload_survives_chunked_relay() {
    let server = TestServer::start(Greeting::Silent).await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    server.wait_for_peers(2).await;

    // Larger than one read chunk, so the server relays it in pieces.
    let payload = vec![b'x'; 1500];
    alice.write_all(&payload).await.unwrap();

    let received = read_exactly(&mut bob, 1500).await;
    assert_eq!(received, payload);

    // The transcript gains a newline per chunk but loses no payload.
    let contents = server
        .wait_for_transcript(|c| c.bytes().filter(|&b| b == b'x').count() == 1500)
        .await;
    assert!(contents.bytes().all(|b| b == b'x' || b == b'\n'));

    server.shutdown().await;
}
