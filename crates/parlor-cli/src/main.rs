//! Parlor terminal client entry point.
//!
//! # Usage
//!
//! ```bash
//! # Room-aware backend on the default address
//! parlor
//!
//! # Legacy backend without rooms
//! parlor --url http://chat.local:3002 --legacy
//! ```

use clap::Parser;
use parlor_app::{PreConnectPolicy, Runtime, SessionConfig};
use parlor_cli::{CliError, TerminalDriver};
use parlor_client::{DEFAULT_SERVER_URL, TransportConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Parlor chat client
#[derive(Parser, Debug)]
#[command(name = "parlor")]
#[command(about = "Terminal client for Parlor chat rooms")]
#[command(version)]
struct Args {
    /// Backend base URL (http, https, ws or wss)
    #[arg(short, long, default_value = DEFAULT_SERVER_URL)]
    url: String,

    /// Talk to a backend without rooms (messages carry the username)
    #[arg(long)]
    legacy: bool,

    /// Drop events tagged with a room other than the joined one
    #[arg(long)]
    filter_by_room: bool,

    /// Discard messages sent before the connection is up instead of queueing
    #[arg(long)]
    drop_before_connect: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn session_config(&self) -> SessionConfig {
        let pre_connect = if self.drop_before_connect {
            PreConnectPolicy::Drop
        } else {
            PreConnectPolicy::Queue
        };
        let base = if self.legacy { SessionConfig::legacy() } else { SessionConfig::default() };
        base.with_room_filter(self.filter_by_room).with_pre_connect(pre_connect)
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // Logs go to stderr; stdout carries the chat
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let transport = TransportConfig::new(args.url.clone());
    let endpoint = transport.endpoint().map_err(|e| CliError::Args(e.to_string()))?;
    tracing::info!(%endpoint, legacy = args.legacy, "parlor starting");

    let driver = TerminalDriver::new(transport);
    Runtime::new(driver, args.session_config(), args.url).run().await?;

    tracing::info!("parlor stopped");
    Ok(())
}
