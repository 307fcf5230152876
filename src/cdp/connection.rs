//! DevTools WebSocket connection and event loop.
//!
//! This module handles the WebSocket connection to the browser's DevTools
//! endpoint, including request/response correlation and shutdown.
//!
//! # Event Loop
//!
//! The connection spawns a tokio task that handles:
//!
//! - Incoming messages from the browser (responses, events)
//! - Outgoing commands from the Rust API
//! - Request/response correlation by command id

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{from_str, to_string};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, trace, warn};
use url::Url;

use crate::error::{Error, Result};

use super::command::{CdpEvent, CdpRequest, CdpResponse};

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for command execution.
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum pending requests before rejecting new ones.
const MAX_PENDING_REQUESTS: usize = 100;

// ============================================================================
// Types
// ============================================================================

/// WebSocket stream to the DevTools endpoint.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Sink half of the WebSocket stream.
type WsSink = futures_util::stream::SplitSink<WsStream, Message>;

/// Map of command ids to response channels.
type CorrelationMap = FxHashMap<u64, oneshot::Sender<Result<CdpResponse>>>;

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Send a request and wait for a response.
    Send {
        request: CdpRequest,
        response_tx: oneshot::Sender<Result<CdpResponse>>,
    },
    /// Remove a timed-out correlation entry.
    RemoveCorrelation(u64),
    /// Shutdown the connection.
    Shutdown,
}

// ============================================================================
// CdpConnection
// ============================================================================

/// Connection to a browser's DevTools endpoint.
///
/// Handles request/response correlation over a single WebSocket. The
/// connection spawns an internal event loop task.
///
/// # Thread Safety
///
/// `CdpConnection` is `Send + Sync` and can be shared across tasks.
/// All operations are non-blocking.
pub struct CdpConnection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Correlation map (shared with the event loop).
    correlation: Arc<Mutex<CorrelationMap>>,
}

impl Clone for CdpConnection {
    fn clone(&self) -> Self {
        Self {
            command_tx: self.command_tx.clone(),
            correlation: Arc::clone(&self.correlation),
        }
    }
}

impl CdpConnection {
    /// Connects to a DevTools WebSocket endpoint.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the URL is not valid
    /// - [`Error::WebSocket`] if the connection cannot be established
    pub async fn connect(ws_url: &str) -> Result<Self> {
        let url = Url::parse(ws_url)
            .map_err(|e| Error::connection(format!("Invalid DevTools URL {ws_url}: {e}")))?;

        let (ws_stream, _) = connect_async(url.as_str()).await?;
        debug!(url = %url, "Connected to DevTools endpoint");

        Ok(Self::new(ws_stream))
    }

    /// Creates a connection from an established WebSocket stream.
    ///
    /// Spawns the event loop task internally.
    pub(crate) fn new(ws_stream: WsStream) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let correlation = Arc::new(Mutex::new(CorrelationMap::default()));

        tokio::spawn(Self::run_event_loop(
            ws_stream,
            command_rx,
            Arc::clone(&correlation),
        ));

        Self {
            command_tx,
            correlation,
        }
    }

    /// Sends a request and waits for its response with the default timeout.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the connection is closed
    /// - [`Error::Timeout`] if no response arrives within the timeout
    /// - [`Error::Protocol`] if too many requests are pending
    pub async fn send(&self, request: CdpRequest) -> Result<CdpResponse> {
        self.send_with_timeout(request, DEFAULT_COMMAND_TIMEOUT)
            .await
    }

    /// Sends a request and waits for its response with a custom timeout.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the connection is closed
    /// - [`Error::Timeout`] if no response arrives within the timeout
    /// - [`Error::Protocol`] if too many requests are pending
    pub async fn send_with_timeout(
        &self,
        request: CdpRequest,
        request_timeout: Duration,
    ) -> Result<CdpResponse> {
        let command_id = request.id;
        let method = request.method.clone();

        // Check pending request limit
        {
            let correlation = self.correlation.lock();
            if correlation.len() >= MAX_PENDING_REQUESTS {
                warn!(
                    pending = correlation.len(),
                    max = MAX_PENDING_REQUESTS,
                    "Too many pending requests"
                );
                return Err(Error::protocol(format!(
                    "Too many pending requests: {}/{}",
                    correlation.len(),
                    MAX_PENDING_REQUESTS
                )));
            }
        }

        let (response_tx, response_rx) = oneshot::channel();

        self.command_tx
            .send(ConnectionCommand::Send {
                request,
                response_tx,
            })
            .map_err(|_| Error::ConnectionClosed)?;

        match timeout(request_timeout, response_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                // Timeout - clean up the correlation entry
                let _ = self
                    .command_tx
                    .send(ConnectionCommand::RemoveCorrelation(command_id));

                Err(Error::timeout(method, request_timeout.as_millis() as u64))
            }
        }
    }

    /// Returns the number of pending requests.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.correlation.lock().len()
    }

    /// Shuts down the connection gracefully.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop(
        ws_stream: WsStream,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        correlation: Arc<Mutex<CorrelationMap>>,
    ) {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                // Incoming messages from the browser
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            Self::handle_incoming_message(&text, &correlation);
                        }

                        Some(Ok(Message::Close(_))) => {
                            debug!("WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ignore Binary, Ping, Pong
                        _ => {}
                    }
                }

                // Commands from the Rust API
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send { request, response_tx }) => {
                            Self::handle_send_command(
                                request,
                                response_tx,
                                &mut ws_write,
                                &correlation,
                            ).await;
                        }

                        Some(ConnectionCommand::RemoveCorrelation(command_id)) => {
                            correlation.lock().remove(&command_id);
                            debug!(command_id, "Removed timed-out correlation");
                        }

                        Some(ConnectionCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        // Fail all pending requests on shutdown
        Self::fail_pending_requests(&correlation);

        debug!("Event loop terminated");
    }

    /// Handles an incoming text message from the browser.
    fn handle_incoming_message(text: &str, correlation: &Arc<Mutex<CorrelationMap>>) {
        // Responses carry an id; try those first.
        if let Ok(response) = from_str::<CdpResponse>(text) {
            let tx = correlation.lock().remove(&response.id);

            if let Some(tx) = tx {
                let _ = tx.send(Ok(response));
            } else {
                warn!(id = response.id, "Response for unknown command");
            }

            return;
        }

        // Everything else is an event notification.
        if let Ok(event) = from_str::<CdpEvent>(text) {
            trace!(method = %event.method, "Event received");
            return;
        }

        warn!(text = %text, "Failed to parse incoming message");
    }

    /// Handles a send command from the Rust API.
    async fn handle_send_command(
        request: CdpRequest,
        response_tx: oneshot::Sender<Result<CdpResponse>>,
        ws_write: &mut WsSink,
        correlation: &Arc<Mutex<CorrelationMap>>,
    ) {
        let command_id = request.id;

        // Serialize request
        let json = match to_string(&request) {
            Ok(j) => j,
            Err(e) => {
                let _ = response_tx.send(Err(Error::Json(e)));
                return;
            }
        };

        // Store correlation before sending
        correlation.lock().insert(command_id, response_tx);

        // Send over WebSocket
        if let Err(e) = ws_write.send(Message::Text(json.into())).await {
            // Remove correlation and notify caller
            if let Some(tx) = correlation.lock().remove(&command_id) {
                let _ = tx.send(Err(Error::connection(e.to_string())));
            }
        }

        trace!(command_id, "Request sent");
    }

    /// Fails all pending requests with a ConnectionClosed error.
    fn fail_pending_requests(correlation: &Arc<Mutex<CorrelationMap>>) {
        let pending: Vec<_> = correlation.lock().drain().collect();
        let count = pending.len();

        for (_, tx) in pending {
            let _ = tx.send(Err(Error::ConnectionClosed));
        }

        if count > 0 {
            debug!(count, "Failed pending requests on shutdown");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
