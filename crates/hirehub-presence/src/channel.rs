//! Realtime channel seam between the notification subscriber and the wire.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use hirehub_common::CredentialProvider;
use tokio::sync::mpsc;

/// Lifecycle and payload events emitted by an open channel, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// A connect attempt is starting.
    Connecting,
    /// The session handshake completed.
    Connected,
    /// A message arrived on a subscribed destination.
    Message { destination: String, body: String },
    /// The server reported a protocol-level error.
    StompError { message: String },
    /// The socket failed to open or dropped unexpectedly.
    TransportError(String),
    /// The server closed the session cleanly.
    Disconnected,
}

/// Everything a channel needs to connect and keep itself alive.
#[derive(Clone)]
pub struct ChannelOptions {
    /// WebSocket endpoint, e.g. `ws://localhost:8080/ws`.
    pub url: String,
    /// Read again before every connect attempt.
    pub credentials: Arc<dyn CredentialProvider>,
    pub reconnect_delay: Duration,
    pub heartbeat_outgoing: Duration,
    pub heartbeat_incoming: Duration,
    pub connect_timeout: Duration,
}

impl fmt::Debug for ChannelOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelOptions")
            .field("url", &self.url)
            .field("credentials", &"[REDACTED]")
            .field("reconnect_delay", &self.reconnect_delay)
            .field("heartbeat_outgoing", &self.heartbeat_outgoing)
            .field("heartbeat_incoming", &self.heartbeat_incoming)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Handle to an open channel. Methods never block.
pub trait RealtimeChannel: Send + Sync {
    /// Subscribe to `destination` on the current session.
    ///
    /// Subscriptions do not survive a reconnect; callers re-subscribe on
    /// every [`ChannelEvent::Connected`].
    fn subscribe(&self, destination: &str);

    /// Close the channel and stop reconnecting.
    fn deactivate(&self);
}

/// Opens realtime channels. `open` must return immediately; connecting
/// happens in the background and is reported through the event receiver.
pub trait RealtimeChannelFactory: Send + Sync {
    fn open(
        &self,
        options: ChannelOptions,
    ) -> (Box<dyn RealtimeChannel>, mpsc::Receiver<ChannelEvent>);
}
