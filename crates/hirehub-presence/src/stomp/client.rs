//! Public handle for a STOMP connection.

use tokio::sync::mpsc;
use tracing::debug;

use super::connection::connection_loop;
use super::types::StompCommand;
use crate::channel::{ChannelEvent, ChannelOptions, RealtimeChannel, RealtimeChannelFactory};

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Handle for a background STOMP connection.
///
/// All methods are non-blocking and send commands to the connection task.
/// Dropping the handle stops the connection as if `deactivate` was called.
pub struct StompClient {
    command_tx: mpsc::UnboundedSender<StompCommand>,
}

impl StompClient {
    /// Start the background connection.
    /// Returns `(client, event_receiver)`.
    pub fn connect(options: ChannelOptions) -> (Self, mpsc::Receiver<ChannelEvent>) {
        let (event_tx, event_rx) = mpsc::channel(256);
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        debug!(?options, "Starting STOMP client");
        tokio::spawn(connection_loop(options, event_tx, command_rx));

        (Self { command_tx }, event_rx)
    }
}

impl RealtimeChannel for StompClient {
    fn subscribe(&self, destination: &str) {
        let _ = self.command_tx.send(StompCommand::Subscribe {
            destination: destination.to_string(),
        });
    }

    fn deactivate(&self) {
        let _ = self.command_tx.send(StompCommand::Disconnect);
    }
}

/// Opens [`StompClient`] channels.
#[derive(Debug, Default, Clone, Copy)]
pub struct StompChannelFactory;

impl RealtimeChannelFactory for StompChannelFactory {
    fn open(
        &self,
        options: ChannelOptions,
    ) -> (Box<dyn RealtimeChannel>, mpsc::Receiver<ChannelEvent>) {
        let (client, events) = StompClient::connect(options);
        (Box::new(client), events)
    }
}
