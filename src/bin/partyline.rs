//! partyline - a tiny LAN chat over raw TCP
//!
//! One process hosts the room; everyone else connects to it. Every
//! message a peer sends is relayed to every connected peer, the sender
//! included, and the host appends each relayed message to a transcript
//! file.
//!
//! # Usage
//!
//! ```bash
//! # Host a room on 0.0.0.0:12345
//! partyline server
//!
//! # Host without the connect animation, with a custom transcript
//! partyline server --no-banner --transcript /tmp/chat.txt
//!
//! # Join a room
//! partyline client 192.168.1.20
//!
//! # Enable debug logging
//! RUST_LOG=partyline_server=debug partyline server
//! ```
//!
//! # Signal Handling
//!
//! - Server: Ctrl-C closes the operator input feed; peers keep chatting
//! - Client: Ctrl-C leaves the chat like typing `exit`

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use partyline_client::ClientConfig;
use partyline_core::{os_label, DEFAULT_PORT, DEFAULT_TRANSCRIPT};
use partyline_server::{Greeting, ServerConfig};

const TRANSCRIPT_ENV: &str = "PARTYLINE_TRANSCRIPT";

/// How long to wait on lingering blocking work at exit.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

/// partyline - relay chat for one room of peers
#[derive(Parser, Debug)]
#[command(name = "partyline", version, about)]
struct Args {
    #[command(subcommand)]
    role: Role,
}

#[derive(Subcommand, Debug)]
enum Role {
    /// Host a room
    Server {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0")]
        bind: IpAddr,

        /// Port to listen on
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Transcript file (falls back to PARTYLINE_TRANSCRIPT, then
        /// chat_messages.txt)
        #[arg(long)]
        transcript: Option<PathBuf>,

        /// Label for the host's messages (default: the OS name)
        #[arg(long)]
        label: Option<String>,

        /// Skip the connect-time greeting animation
        #[arg(long)]
        no_banner: bool,
    },
    /// Join a room
    Client {
        /// Server host to connect to
        host: String,

        /// Port to connect to
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Label for this client's messages (default: the OS name)
        #[arg(long)]
        label: Option<String>,
    },
}

fn welcome_screen() {
    println!(
        r#"
                  _         _ _
 _ __   __ _ _ __| |_ _   _| (_)_ __   ___
| '_ \ / _` | '__| __| | | | | | '_ \ / _ \
| |_) | (_| | |  | |_| |_| | | | | | |  __/
| .__/ \__,_|_|   \__|\__, |_|_|_| |_|\___|
|_|                   |___/
"#
    );
}

fn main() {
    welcome_screen();

    let args = Args::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("error: failed to start runtime: {error}");
            process::exit(1);
        }
    };
    let result = runtime.block_on(run(args));
    // Stdin reads park blocking threads; do not wait on them at exit.
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    if let Err(error) = result {
        eprintln!("error: {error:#}");
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    init_logging();

    info!(version = env!("CARGO_PKG_VERSION"), "partyline starting");

    match args.role {
        Role::Server {
            bind,
            port,
            transcript,
            label,
            no_banner,
        } => {
            let greeting = if no_banner {
                Greeting::Silent
            } else {
                Greeting::default()
            };
            let config = ServerConfig {
                bind,
                port,
                transcript_path: transcript_path(transcript),
                greeting,
                host_label: label.unwrap_or_else(|| os_label().to_string()),
            };
            partyline_server::run(config).await?;
        }
        Role::Client { host, port, label } => {
            let mut config = ClientConfig::new(host);
            config.port = port;
            if let Some(label) = label {
                config.label = label;
            }
            partyline_client::run(config).await?;
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("partyline=warn,partyline_core=warn,partyline_server=warn,partyline_client=warn")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Transcript path resolution: flag, then environment, then default.
fn transcript_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| env::var(TRANSCRIPT_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TRANSCRIPT))
}
