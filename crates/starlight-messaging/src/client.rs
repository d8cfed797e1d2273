//! Realtime messaging client
//!
//! WebSocket wrapper with heartbeat, backoff reconnect, and
//! manual-close suppression. The connection lifecycle runs inside a
//! supervised task; reconnection is owned by the close path alone, so
//! socket errors only notify and let the close handling decide.
//!
//! States: Disconnected -> Connecting -> Connected ->
//! (Closing | Reconnecting) -> Disconnected.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use starlight_common::Notifier;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at, sleep};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use crate::error::{MessagingError, Result};
use crate::model::{InstantMessage, InstantMessageType};

/// Configuration for the messaging client
#[derive(Clone, Debug)]
pub struct MessagingConfig {
    /// Messaging server URL (ws:// or wss://)
    pub server_url: String,
    /// Interval between PING frames while the socket is open
    pub heartbeat_interval: Duration,
    /// Per-attempt reconnect delay step (delay = attempt * step)
    pub reconnect_step: Duration,
    /// Maximum number of reconnect attempts before giving up
    pub max_retries: u32,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:8090/im".to_string(),
            heartbeat_interval: Duration::from_secs(30),
            reconnect_step: Duration::from_secs(2),
            max_retries: 5,
        }
    }
}

impl MessagingConfig {
    pub fn new(server_url: &str) -> Self {
        Self {
            server_url: server_url.to_string(),
            ..Default::default()
        }
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn with_reconnect(mut self, step: Duration, max_retries: u32) -> Self {
        self.reconnect_step = step;
        self.max_retries = max_retries;
        self
    }
}

/// Connection lifecycle state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Closing,
    Reconnecting,
}

/// Delay before reconnect attempt number `attempt` (1-based)
pub fn reconnect_delay(attempt: u32, step: Duration) -> Duration {
    step * attempt
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Reconnecting WebSocket client for the instant message server.
///
/// The raw socket never leaves this type; consumers interact through
/// `send` and the two broadcast channels (`PUSH` frames fan out on the
/// global channel, every other non-PONG frame on the user channel).
pub struct MessagingClient {
    config: MessagingConfig,
    notifier: Arc<dyn Notifier>,
    state: Mutex<ConnectionState>,
    outbound: RwLock<Option<mpsc::Sender<String>>>,
    retry: AtomicU32,
    manually_closed: AtomicBool,
    local_user: RwLock<Option<String>>,
    global_tx: broadcast::Sender<InstantMessage>,
    user_tx: broadcast::Sender<InstantMessage>,
    supervisor: Mutex<Option<JoinHandle<()>>>,
}

impl MessagingClient {
    pub fn new(config: MessagingConfig, notifier: Arc<dyn Notifier>) -> Self {
        let (global_tx, _) = broadcast::channel(64);
        let (user_tx, _) = broadcast::channel(64);
        Self {
            config,
            notifier,
            state: Mutex::new(ConnectionState::Disconnected),
            outbound: RwLock::new(None),
            retry: AtomicU32::new(0),
            manually_closed: AtomicBool::new(false),
            local_user: RwLock::new(None),
            global_tx,
            user_tx,
            supervisor: Mutex::new(None),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Identity stamped as `from` on outgoing messages
    pub fn set_local_user(&self, user_id: Option<String>) {
        *self.local_user.write() = user_id;
    }

    /// Broadcast channel carrying PUSH frames
    pub fn subscribe_global(&self) -> broadcast::Receiver<InstantMessage> {
        self.global_tx.subscribe()
    }

    /// Broadcast channel carrying per-user frames
    pub fn subscribe_user(&self) -> broadcast::Receiver<InstantMessage> {
        self.user_tx.subscribe()
    }

    /// Open the connection; no-op when one is already running
    pub fn connect(self: &Arc<Self>, token: &str) {
        {
            let mut state = self.state.lock();
            if *state != ConnectionState::Disconnected {
                debug!("messaging connect ignored, state={:?}", *state);
                return;
            }
            *state = ConnectionState::Connecting;
        }

        self.manually_closed.store(false, Ordering::SeqCst);
        self.retry.store(0, Ordering::SeqCst);

        let url = format!("{}?token={}", self.config.server_url, token);
        let client = self.clone();
        let handle = tokio::spawn(async move { client.run(url).await });
        *self.supervisor.lock() = Some(handle);
    }

    /// Close the connection and suppress automatic reconnection
    pub fn disconnect(&self) {
        self.manually_closed.store(true, Ordering::SeqCst);
        {
            let mut state = self.state.lock();
            if *state != ConnectionState::Disconnected {
                *state = ConnectionState::Closing;
            }
        }
        // Dropping the sender closes the serve loop, which sends the
        // close frame itself
        *self.outbound.write() = None;
    }

    /// Send a message, stamping the local user identity as `from`
    pub fn send(&self, mut message: InstantMessage) -> Result<()> {
        let sender = self.outbound.read().clone();
        let Some(sender) = sender else {
            warn!("messaging not connected, message dropped");
            return Err(MessagingError::NotConnected);
        };

        message.from = self.local_user.read().clone();
        let text = serde_json::to_string(&message)?;
        sender
            .try_send(text)
            .map_err(|_| MessagingError::NotConnected)
    }

    async fn run(self: Arc<Self>, url: String) {
        loop {
            *self.state.lock() = ConnectionState::Connecting;

            match connect_async(url.as_str()).await {
                Ok((stream, _)) => {
                    if self.manually_closed.load(Ordering::SeqCst) {
                        *self.state.lock() = ConnectionState::Disconnected;
                        return;
                    }

                    info!("messaging connected to {}", self.config.server_url);
                    *self.state.lock() = ConnectionState::Connected;
                    self.notifier
                        .success("Messaging", "Connected to the message server.");

                    let (out_tx, out_rx) = mpsc::channel(64);
                    *self.outbound.write() = Some(out_tx);
                    self.serve(stream, out_rx).await;
                    *self.outbound.write() = None;
                }
                Err(e) => {
                    warn!("messaging connect failed: {}", e);
                }
            }

            if self.manually_closed.load(Ordering::SeqCst) {
                debug!("messaging closed by operator");
                *self.state.lock() = ConnectionState::Disconnected;
                return;
            }

            let attempt = self.retry.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt > self.config.max_retries {
                warn!(
                    "messaging reconnect limit reached after {} attempts",
                    self.config.max_retries
                );
                *self.state.lock() = ConnectionState::Disconnected;
                return;
            }

            *self.state.lock() = ConnectionState::Reconnecting;
            let delay = reconnect_delay(attempt, self.config.reconnect_step);
            debug!("messaging reconnect attempt {} in {:?}", attempt, delay);
            sleep(delay).await;

            if self.manually_closed.load(Ordering::SeqCst) {
                *self.state.lock() = ConnectionState::Disconnected;
                return;
            }
        }
    }

    /// Pump one open socket until it closes
    async fn serve(&self, stream: WsStream, mut out_rx: mpsc::Receiver<String>) {
        let (mut sink, mut read) = stream.split();
        let mut heartbeat = interval_at(
            Instant::now() + self.config.heartbeat_interval,
            self.config.heartbeat_interval,
        );

        loop {
            tokio::select! {
                frame = read.next() => match frame {
                    // The retry budget refills only once the server
                    // sends a frame; a handshake followed by an
                    // immediate drop still counts toward the cap
                    Some(Ok(Message::Text(text))) => {
                        self.retry.store(0, Ordering::SeqCst);
                        self.dispatch_frame(text.as_str());
                    }
                    Some(Ok(Message::Close(_))) => {
                        debug!("messaging server closed the connection");
                        break;
                    }
                    Some(Ok(_)) => {
                        self.retry.store(0, Ordering::SeqCst);
                    }
                    Some(Err(e)) => {
                        warn!("messaging socket error: {}", e);
                        self.notifier
                            .error("Messaging", "Disconnected from the message server!");
                        break;
                    }
                    None => break,
                },
                _ = heartbeat.tick() => {
                    if let Ok(ping) = serde_json::to_string(&InstantMessage::ping()) {
                        if sink.send(Message::Text(ping.into())).await.is_err() {
                            break;
                        }
                    }
                },
                outgoing = out_rx.recv() => match outgoing {
                    Some(text) => {
                        if sink.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    // Operator disconnect: close cleanly
                    None => {
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                },
            }
        }
    }

    fn dispatch_frame(&self, text: &str) {
        match serde_json::from_str::<InstantMessage>(text) {
            Ok(message) => match message.message_type {
                InstantMessageType::Pong => {}
                InstantMessageType::Push => {
                    let _ = self.global_tx.send(message);
                }
                _ => {
                    let _ = self.user_tx.send(message);
                }
            },
            Err(e) => warn!("discarding unparsable message frame: {}", e),
        }
    }
}

impl Drop for MessagingClient {
    fn drop(&mut self) {
        self.manually_closed.store(true, Ordering::SeqCst);
        if let Some(handle) = self.supervisor.lock().take() {
            handle.abort();
        }
    }
}
