//! Chat client: prompt loop out, framed chunks in.
//!
//! Two halves run side by side. The reader task prints every chunk the
//! server relays, set off by dashed separators so interleaved messages
//! stay readable. The prompt loop tags each typed line with the
//! client's label and sends it as a single unframed write. Typing
//! `exit` leaves the chat without sending anything.

use std::io::Write as _;
use std::str;

use partyline_core::{os_label, tag_line, DEFAULT_PORT, READ_CHUNK_SIZE};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::io::{BufReader, Lines};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{ClientError, Result};

const SEPARATOR_WIDTH: usize = 40;

/// Client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub label: String,
}

impl ClientConfig {
    /// Settings for the given host, on the default port, labeled after
    /// the local platform.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            label: os_label().to_string(),
        }
    }
}

/// A connected chat participant.
pub struct ChatClient {
    config: ClientConfig,
    cancel_token: CancellationToken,
}

impl ChatClient {
    pub fn new(config: ClientConfig, cancel_token: CancellationToken) -> Self {
        Self {
            config,
            cancel_token,
        }
    }

    /// Connects and chats until the operator quits, stdin closes, or
    /// the connection fails.
    pub async fn run(&self) -> Result<()> {
        let host = &self.config.host;
        let port = self.config.port;
        let stream = TcpStream::connect((host.as_str(), port))
            .await
            .map_err(|error| ClientError::Connect {
                host: host.clone(),
                port,
                error: error.to_string(),
            })?;
        println!("connected to {host} on port {port}");

        let (reader, mut writer) = stream.into_split();
        let reader_task = tokio::spawn(read_loop(reader, self.cancel_token.clone()));

        let mut input = BufReader::new(tokio::io::stdin()).lines();
        let result = self.chat_loop(&mut writer, &mut input).await;

        self.cancel_token.cancel();
        let _ = reader_task.await;
        result
    }

    /// Prompts, reads lines, and sends them tagged.
    ///
    /// Each send is one `write_all` of the tagged line with no trailing
    /// newline; the wire carries no framing. Returns on `exit`, on end
    /// of input, or when the token fires.
    async fn chat_loop<W, R>(&self, writer: &mut W, input: &mut Lines<R>) -> Result<()>
    where
        W: AsyncWrite + Unpin,
        R: AsyncBufRead + Unpin,
    {
        loop {
            print!("{}: ", self.config.label);
            std::io::stdout().flush()?;

            tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    debug!("Prompt loop interrupted");
                    return Ok(());
                }
                line = input.next_line() => match line? {
                    None => return Ok(()),
                    Some(line) => match classify_input(&line) {
                        InputAction::Quit => return Ok(()),
                        InputAction::Send => {
                            let message = tag_line(&self.config.label, &line);
                            writer.write_all(message.as_bytes()).await?;
                        }
                    },
                },
            }
        }
    }
}

/// Prints every relayed chunk until the connection closes, the chunk
/// fails to decode, or the token fires.
///
/// The loop ends quietly on a clean close; the prompt loop decides when
/// the client as a whole is done.
async fn read_loop(mut reader: OwnedReadHalf, cancel_token: CancellationToken) {
    let mut buf = [0u8; READ_CHUNK_SIZE];
    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => return,
            read = reader.read(&mut buf) => match read {
                Ok(0) => {
                    debug!("Server closed the connection");
                    return;
                }
                Ok(n) => match str::from_utf8(&buf[..n]) {
                    Ok(text) => print!("{}", frame_chunk(text)),
                    Err(error) => {
                        eprintln!("reader error: {error}");
                        return;
                    }
                },
                Err(error) => {
                    eprintln!("reader error: {error}");
                    return;
                }
            },
        }
    }
}

/// Lays out one received chunk between dashed separators.
pub fn frame_chunk(text: &str) -> String {
    let rule = "-".repeat(SEPARATOR_WIDTH);
    format!("\n{rule}\n{text}\n{rule}\n\n")
}

enum InputAction {
    Quit,
    Send,
}

/// The literal word `exit`, any case, quits. Everything else is sent,
/// the empty line included.
fn classify_input(line: &str) -> InputAction {
    if line.eq_ignore_ascii_case("exit") {
        InputAction::Quit
    } else {
        InputAction::Send
    }
}
