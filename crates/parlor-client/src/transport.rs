//! WebSocket transport for the client.
//!
//! Provides [`ConnectedClient`] which handles the socket I/O for packet
//! transport. This is a thin layer that just moves frames: protocol logic
//! remains in the Sans-IO [`EngineSession`], chat logic above it.
//!
//! Only plain `ws://` endpoints are supported. `wss://` fails at connect time
//! because no TLS backend is compiled in.

use std::{
    ops::ControlFlow,
    time::{Duration, Instant},
};

use futures::{SinkExt, StreamExt, stream::SplitSink};
use parlor_proto::Packet;
use tokio::{
    net::TcpStream,
    sync::{mpsc, oneshot},
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

use crate::{EngineAction, EngineConfig, EngineSession, EngineState, TransportConfig, TransportError};

/// How often the liveness check runs.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

/// Handle to a connected client with WebSocket transport.
///
/// Provides channels for packet transport. Packets are sent/received via the
/// channels, and an internal task handles the socket I/O. `from_server`
/// closes when the connection ends for any reason.
pub struct ConnectedClient {
    /// Send packets to the server.
    pub to_server: mpsc::Sender<Packet>,
    /// Receive packets from the server.
    pub from_server: mpsc::Receiver<Packet>,
    /// Graceful shutdown signal. `None` once used.
    shutdown: Option<oneshot::Sender<()>>,
    /// Abort handle to stop the connection task.
    abort_handle: tokio::task::AbortHandle,
}

impl ConnectedClient {
    /// Stop the connection.
    ///
    /// Asks the task to leave the namespace and close the socket. Calling it
    /// again is a no-op. Dropping the handle aborts the task outright.
    pub fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            if shutdown.send(()).is_err() {
                // Task already gone
                self.abort_handle.abort();
            }
        }
    }

    /// Whether the connection task has ended.
    pub fn is_finished(&self) -> bool {
        self.abort_handle.is_finished()
    }
}

impl Drop for ConnectedClient {
    fn drop(&mut self) {
        self.abort_handle.abort();
    }
}

/// Connect to a Socket.IO backend over WebSocket.
///
/// Returns a [`ConnectedClient`] with channels for packet transport. The
/// Socket.IO namespace connect is requested automatically once the
/// Engine.IO handshake arrives; the server's accept shows up on
/// `from_server` as a [`Packet::Connect`] carrying the client's id.
pub async fn connect(config: &TransportConfig) -> Result<ConnectedClient, TransportError> {
    let endpoint = config.endpoint()?;

    let (socket, _response) = tokio_tungstenite::connect_async(endpoint.as_str())
        .await
        .map_err(|e| TransportError::Connection(format!("{endpoint}: {e}")))?;

    tracing::info!(%endpoint, "websocket connected");

    let (to_server_tx, to_server_rx) = mpsc::channel::<Packet>(config.capacity());
    let (from_server_tx, from_server_rx) = mpsc::channel::<Packet>(config.capacity());
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let handle =
        tokio::spawn(run_connection(socket, to_server_rx, from_server_tx, shutdown_rx));

    Ok(ConnectedClient {
        to_server: to_server_tx,
        from_server: from_server_rx,
        shutdown: Some(shutdown_tx),
        abort_handle: handle.abort_handle(),
    })
}

/// Run the connection, bridging between channels and the socket.
async fn run_connection(
    socket: WsStream,
    mut to_server: mpsc::Receiver<Packet>,
    from_server: mpsc::Sender<Packet>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let (mut sink, mut stream) = socket.split();
    let mut engine = EngineSession::new(Instant::now(), &EngineConfig::default());
    let mut ticker = tokio::time::interval(TICK_INTERVAL);

    loop {
        let actions = tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    match engine.handle_text(text.as_str(), Instant::now()) {
                        Ok(actions) => actions,
                        Err(e) => {
                            tracing::warn!(error = %e, "dropping engine frame");
                            continue;
                        },
                    }
                },
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(?frame, "server closed websocket");
                    break;
                },
                // Binary frames carry attachments we do not support; control
                // frames are answered by tungstenite itself.
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "websocket read failed");
                    break;
                },
                None => break,
            },

            outgoing = to_server.recv() => match outgoing {
                Some(packet) => match engine.encode_packet(&packet) {
                    Ok(text) => vec![EngineAction::SendText(text)],
                    Err(e) => {
                        tracing::warn!(error = %e, "dropping outgoing packet");
                        continue;
                    },
                },
                None => engine.close(),
            },

            _ = &mut shutdown => engine.close(),

            _ = ticker.tick() => engine.tick(Instant::now()),
        };

        if execute(&mut sink, &from_server, actions).await.is_break()
            || engine.state() == EngineState::Closed
        {
            break;
        }
    }

    if let Err(e) = sink.close().await {
        tracing::debug!(error = %e, "websocket close failed");
    }
}

/// Execute engine actions. Breaks when the connection should end.
async fn execute(
    sink: &mut WsSink,
    from_server: &mpsc::Sender<Packet>,
    actions: Vec<EngineAction>,
) -> ControlFlow<()> {
    for action in actions {
        match action {
            EngineAction::SendText(text) => {
                if let Err(e) = sink.send(Message::text(text)).await {
                    tracing::warn!(error = %e, "websocket write failed");
                    return ControlFlow::Break(());
                }
            },
            EngineAction::Deliver(packet) => {
                if from_server.send(packet).await.is_err() {
                    tracing::debug!("packet receiver dropped");
                    return ControlFlow::Break(());
                }
            },
            EngineAction::Close { reason } => {
                tracing::info!(%reason, "closing connection");
                return ControlFlow::Break(());
            },
        }
    }
    ControlFlow::Continue(())
}
