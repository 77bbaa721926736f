//! Terminal driver for the CLI.
//!
//! Implements the [`Driver`] trait over line-buffered stdin/stdout. Network
//! I/O goes through the WebSocket transport from `parlor-client`.

use std::io::{self, Stdout, Write};

use parlor_app::{Driver, DriverEvent, Session};
use parlor_client::{
    TransportConfig, TransportError,
    transport::{self, ConnectedClient},
};
use parlor_proto::Packet;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::{
    input::{self, Command},
    render::Transcript,
};

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The connection task is gone.
    #[error("connection closed")]
    ChannelClosed,
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Reads one command or message per stdin line and prints the session as an
/// append-only transcript.
pub struct TerminalDriver {
    lines: Lines<BufReader<Stdin>>,
    stdout: Stdout,
    transcript: Transcript,
    config: TransportConfig,
    connection: Option<ConnectedClient>,
}

impl TerminalDriver {
    /// Create a driver for the backend described by `config`.
    pub fn new(config: TransportConfig) -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            stdout: io::stdout(),
            transcript: Transcript::new(),
            config,
            connection: None,
        }
    }

    fn print(&mut self, line: &str) -> Result<(), TerminalError> {
        let mut out = self.stdout.lock();
        writeln!(out, "{line}")?;
        out.flush()?;
        Ok(())
    }

    /// Turn an input line into an event, or handle it locally.
    fn handle_line(&mut self, line: &str) -> Result<Option<DriverEvent>, TerminalError> {
        let Some(command) = input::parse(line) else {
            return Ok(None);
        };

        match command {
            Command::Help => self.print(input::HELP)?,
            Command::Unknown { input } => self.print(&format!("-- unknown command: /{input}"))?,
            Command::InvalidArgs { command, error } => {
                self.print(&format!("-- /{command}: {error}"))?;
            },
            command => return Ok(command.into_intent().map(DriverEvent::Intent)),
        }
        Ok(None)
    }
}

/// Next packet from the connection, or never when there is none.
async fn next_packet(connection: Option<&mut ConnectedClient>) -> Option<Packet> {
    match connection {
        Some(connection) => connection.from_server.recv().await,
        None => std::future::pending().await,
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn poll_event(&mut self) -> Result<Option<DriverEvent>, Self::Error> {
        loop {
            tokio::select! {
                line = self.lines.next_line() => {
                    let Some(line) = line? else {
                        tracing::debug!("stdin closed");
                        return Ok(None);
                    };
                    if let Some(event) = self.handle_line(&line)? {
                        return Ok(Some(event));
                    }
                }

                packet = next_packet(self.connection.as_mut()) => {
                    if let Some(packet) = packet {
                        return Ok(Some(DriverEvent::Packet(packet)));
                    }
                    // Reported once; later input still reaches the session
                    self.connection = None;
                    return Ok(Some(DriverEvent::Closed));
                }
            }
        }
    }

    async fn send_packet(&mut self, packet: Packet) -> Result<(), Self::Error> {
        let Some(connection) = &self.connection else {
            return Err(TerminalError::ChannelClosed);
        };
        connection.to_server.send(packet).await.map_err(|_| TerminalError::ChannelClosed)
    }

    async fn connect(&mut self, url: &str) -> Result<(), Self::Error> {
        self.config.base_url = url.to_string();
        let client = transport::connect(&self.config).await?;
        self.connection = Some(client);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connection.as_ref().is_some_and(|c| !c.is_finished())
    }

    fn render(&mut self, session: &Session) -> Result<(), Self::Error> {
        for line in self.transcript.update(session) {
            self.print(&line)?;
        }
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(connection) = self.connection.as_mut() {
            connection.stop();
        }
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
