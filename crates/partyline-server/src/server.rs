//! Accept loop and server assembly.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use partyline_core::{os_label, Transcript, DEFAULT_PORT, DEFAULT_TRANSCRIPT};
use thiserror::Error;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::broadcast::Broadcaster;
use crate::greeting::Greeting;
use crate::roster::Roster;
use crate::session::PeerSession;

const BACKLOG: u32 = 1024;

/// Server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    pub transcript_path: PathBuf,
    pub greeting: Greeting,
    pub host_label: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            transcript_path: PathBuf::from(DEFAULT_TRANSCRIPT),
            greeting: Greeting::default(),
            host_label: os_label().to_string(),
        }
    }
}

/// The chat host: the accept loop plus the shared relay state.
pub struct ChatServer {
    listener: TcpListener,
    roster: Roster,
    broadcaster: Broadcaster,
    transcript: Transcript,
    greeting: Greeting,
    host_label: String,
    cancel_token: CancellationToken,
}

impl ChatServer {
    /// Binds the listen socket and assembles the relay state.
    ///
    /// The socket gets `SO_REUSEADDR`, so a restarted host can rebind
    /// the port while old connections linger in `TIME_WAIT`.
    pub fn bind(config: ServerConfig, cancel_token: CancellationToken) -> Result<Self, ServerError> {
        let addr = SocketAddr::new(config.bind, config.port);
        let listener = Self::listen(addr).map_err(|error| ServerError::Bind {
            addr,
            error: error.to_string(),
        })?;

        let roster = Roster::new();
        let broadcaster = Broadcaster::new(roster.clone());
        Ok(Self {
            listener,
            roster,
            broadcaster,
            transcript: Transcript::new(config.transcript_path),
            greeting: config.greeting,
            host_label: config.host_label,
            cancel_token,
        })
    }

    fn listen(addr: SocketAddr) -> std::io::Result<TcpListener> {
        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        socket.listen(BACKLOG)
    }

    /// Address actually bound, useful when the configured port was 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn host_label(&self) -> &str {
        &self.host_label
    }

    /// Accepts peers until the token fires or `accept` itself fails.
    ///
    /// A failed accept is fatal. Per-peer failures never are; they end
    /// that peer's session and nothing else.
    pub async fn run(self) -> Result<(), ServerError> {
        let port = self.local_addr().map(|addr| addr.port()).unwrap_or(0);
        println!("server is listening on {port}");
        info!(port, "Listening for peers");

        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    info!("Accept loop stopped");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => self.admit(stream, addr).await,
                    Err(error) => {
                        error!(%error, "Accept failed");
                        return Err(ServerError::Accept(error.to_string()));
                    }
                },
            }
        }
    }

    /// Greets a fresh connection, registers it, and spawns its session.
    ///
    /// The greeting plays before registration, so nothing is relayed to
    /// a peer mid-preamble. It runs on the accept loop, which paces
    /// admissions to one greeting at a time.
    async fn admit(&self, mut stream: TcpStream, addr: SocketAddr) {
        self.greeting.play(&mut stream).await;
        let (reader, writer) = stream.into_split();
        let peer = self.roster.add(addr, writer).await;
        let session = PeerSession::new(
            peer,
            reader,
            self.roster.clone(),
            self.broadcaster.clone(),
            self.transcript.clone(),
        );
        tokio::spawn(session.run());
    }
}

/// Errors that keep the server from starting or from accepting.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {error}")]
    Bind { addr: SocketAddr, error: String },

    #[error("accept failed: {0}")]
    Accept(String),
}
