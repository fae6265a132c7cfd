//! Background STOMP session loop with fixed-delay reconnect.

use std::collections::HashSet;
use std::future::pending;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{interval_at, timeout, Instant, Interval};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use super::frame::{decode_all, Frame};
use super::types::{host_of, Heartbeat, StompCommand};
use crate::channel::{ChannelEvent, ChannelOptions};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWrite = SplitSink<WsStream, WsMessage>;
type WsRead = SplitStream<WsStream>;

/// How a single session ended.
#[derive(Debug)]
enum SessionEnd {
    /// The owner asked us to stop.
    Deactivated,
    /// The server closed the socket without an error.
    Closed,
    /// The server sent an ERROR frame.
    Rejected(String),
    /// Connect failure, socket error, or missed heart-beats.
    Failed(String),
}

// ---------------------------------------------------------------------------
// Connection Loop
// ---------------------------------------------------------------------------

/// Background task owning the socket. Runs until deactivated or until the
/// event receiver is dropped.
pub(crate) async fn connection_loop(
    options: ChannelOptions,
    event_tx: mpsc::Sender<ChannelEvent>,
    mut command_rx: mpsc::UnboundedReceiver<StompCommand>,
) {
    loop {
        if event_tx.send(ChannelEvent::Connecting).await.is_err() {
            return;
        }
        info!(url = %options.url, "Connecting to notification channel");

        let end = match options.credentials.current_token() {
            Some(token) => run_session(&options, &token, &event_tx, &mut command_rx).await,
            None => SessionEnd::Failed("No authentication token".to_string()),
        };

        let event = match end {
            SessionEnd::Deactivated => {
                info!("Notification channel deactivated");
                return;
            }
            SessionEnd::Closed => {
                info!("Server closed notification channel");
                ChannelEvent::Disconnected
            }
            SessionEnd::Rejected(message) => {
                warn!(message = %message, "STOMP error from server");
                ChannelEvent::StompError { message }
            }
            SessionEnd::Failed(reason) => {
                error!(reason = %reason, "Notification channel failed");
                ChannelEvent::TransportError(reason)
            }
        };
        if event_tx.send(event).await.is_err() {
            return;
        }

        info!(
            delay_ms = options.reconnect_delay.as_millis() as u64,
            "Reconnecting notification channel"
        );
        if !wait_for_reconnect(&options, &mut command_rx).await {
            info!("Notification channel deactivated while waiting to reconnect");
            return;
        }
    }
}

/// Sleep out the reconnect delay. Returns `false` if deactivated meanwhile.
async fn wait_for_reconnect(
    options: &ChannelOptions,
    command_rx: &mut mpsc::UnboundedReceiver<StompCommand>,
) -> bool {
    let sleep = tokio::time::sleep(options.reconnect_delay);
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            _ = &mut sleep => return true,
            cmd = command_rx.recv() => match cmd {
                None | Some(StompCommand::Disconnect) => return false,
                Some(StompCommand::Subscribe { destination }) => {
                    debug!(destination = %destination, "Dropping subscribe while disconnected");
                }
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

async fn run_session(
    options: &ChannelOptions,
    token: &str,
    event_tx: &mpsc::Sender<ChannelEvent>,
    command_rx: &mut mpsc::UnboundedReceiver<StompCommand>,
) -> SessionEnd {
    // A deactivate during the handshake drops the half-open socket before
    // CONNECT (and the token) goes out.
    let handshake = handshake(options, token);
    tokio::pin!(handshake);
    let (mut write, mut read, connected) = loop {
        tokio::select! {
            result = &mut handshake => match result {
                Ok(parts) => break parts,
                Err(end) => return end,
            },
            cmd = command_rx.recv() => match cmd {
                None | Some(StompCommand::Disconnect) => return SessionEnd::Deactivated,
                Some(StompCommand::Subscribe { destination }) => {
                    debug!(destination = %destination, "Dropping subscribe before CONNECTED");
                }
            },
        }
    };

    let heartbeat = Heartbeat::negotiate(
        options.heartbeat_outgoing,
        options.heartbeat_incoming,
        connected.get("heart-beat"),
    );
    info!(
        server = connected.get("server").unwrap_or("unknown"),
        ?heartbeat,
        "STOMP session established"
    );
    if event_tx.send(ChannelEvent::Connected).await.is_err() {
        let _ = close(&mut write).await;
        return SessionEnd::Deactivated;
    }

    let mut ping = heartbeat.send_every.map(|d| interval_at(Instant::now() + d, d));
    let mut watchdog = heartbeat
        .expect_every
        .map(|d| interval_at(Instant::now() + d, d));
    let mut last_seen = Instant::now();
    let mut subscribed: HashSet<String> = HashSet::new();

    loop {
        tokio::select! {
            msg = read.next() => {
                last_seen = Instant::now();
                match msg {
                    Some(Ok(WsMessage::Text(text))) => {
                        if let Some(end) = handle_text(text.as_str(), event_tx).await {
                            return end;
                        }
                    }
                    Some(Ok(WsMessage::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => {
                            if let Some(end) = handle_text(text, event_tx).await {
                                return end;
                            }
                        }
                        Err(_) => warn!("Ignoring non-UTF-8 binary message"),
                    },
                    Some(Ok(WsMessage::Close(_))) | None => return SessionEnd::Closed,
                    Some(Err(e)) => return SessionEnd::Failed(format!("WebSocket error: {e}")),
                    Some(Ok(_)) => {}
                }
            }
            cmd = command_rx.recv() => match cmd {
                Some(StompCommand::Subscribe { destination }) => {
                    if !subscribed.contains(&destination) {
                        let frame = Frame::new("SUBSCRIBE")
                            .header("id", format!("sub-{}", subscribed.len()))
                            .header("destination", destination.as_str())
                            .header("ack", "auto");
                        if let Err(e) = send_frame(&mut write, &frame).await {
                            return SessionEnd::Failed(e);
                        }
                        info!(destination = %destination, "Subscribed");
                        subscribed.insert(destination);
                    }
                }
                None | Some(StompCommand::Disconnect) => {
                    let _ = send_frame(&mut write, &Frame::new("DISCONNECT")).await;
                    let _ = close(&mut write).await;
                    return SessionEnd::Deactivated;
                }
            },
            _ = tick(&mut ping) => {
                if let Err(e) = write.send(WsMessage::Text("\n".to_string().into())).await {
                    return SessionEnd::Failed(format!("heart-beat send failed: {e}"));
                }
            }
            _ = tick(&mut watchdog) => {
                if let Some(expected) = heartbeat.expect_every {
                    if last_seen.elapsed() > expected * 2 {
                        return SessionEnd::Failed(format!(
                            "no heart-beat from server in {:?}",
                            last_seen.elapsed()
                        ));
                    }
                }
            }
        }
    }
}

/// Open the socket, send CONNECT and wait for the server's answer.
async fn handshake(
    options: &ChannelOptions,
    token: &str,
) -> Result<(WsWrite, WsRead, Frame), SessionEnd> {
    let ws = match timeout(options.connect_timeout, connect_async(options.url.as_str())).await {
        Ok(Ok((ws, _))) => ws,
        Ok(Err(e)) => return Err(SessionEnd::Failed(format!("WebSocket connect failed: {e}"))),
        Err(_) => {
            return Err(SessionEnd::Failed(format!(
                "WebSocket connect timed out after {:?}",
                options.connect_timeout
            )))
        }
    };
    let (mut write, mut read) = ws.split();

    let connect = Frame::new("CONNECT")
        .header("accept-version", "1.2")
        .header("host", host_of(&options.url))
        .header(
            "heart-beat",
            Heartbeat::offer(options.heartbeat_outgoing, options.heartbeat_incoming),
        )
        .header("Authorization", format!("Bearer {token}"));
    send_frame(&mut write, &connect)
        .await
        .map_err(SessionEnd::Failed)?;

    let connected = match timeout(options.connect_timeout, next_frame(&mut read)).await {
        Ok(result) => result?,
        Err(_) => return Err(SessionEnd::Failed("no CONNECTED frame from server".to_string())),
    };
    match connected.command.as_str() {
        "CONNECTED" => Ok((write, read, connected)),
        "ERROR" => Err(SessionEnd::Rejected(error_message(&connected))),
        other => Err(SessionEnd::Failed(format!(
            "unexpected {other} frame during handshake"
        ))),
    }
}

/// Forward the frames in one text message. Returns the session end if the
/// server sent an ERROR frame or the consumer went away.
async fn handle_text(text: &str, event_tx: &mpsc::Sender<ChannelEvent>) -> Option<SessionEnd> {
    let frames = match decode_all(text) {
        Ok(frames) => frames,
        Err(e) => {
            warn!(error = %e, "Dropping malformed STOMP frame");
            return None;
        }
    };
    for frame in frames {
        match frame.command.as_str() {
            "MESSAGE" => {
                let event = ChannelEvent::Message {
                    destination: frame.get("destination").unwrap_or_default().to_string(),
                    body: frame.body,
                };
                if event_tx.send(event).await.is_err() {
                    return Some(SessionEnd::Deactivated);
                }
            }
            "ERROR" => return Some(SessionEnd::Rejected(error_message(&frame))),
            other => debug!(command = %other, "Ignoring STOMP frame"),
        }
    }
    None
}

fn error_message(frame: &Frame) -> String {
    match frame.get("message") {
        Some(message) if !message.is_empty() => message.to_string(),
        _ if !frame.body.is_empty() => frame.body.trim().to_string(),
        _ => "unknown error".to_string(),
    }
}

/// Wait for the next non-heart-beat frame.
async fn next_frame(read: &mut WsRead) -> Result<Frame, SessionEnd> {
    while let Some(msg) = read.next().await {
        let text = match msg {
            Ok(WsMessage::Text(text)) => text.as_str().to_string(),
            Ok(WsMessage::Binary(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
            Ok(WsMessage::Close(_)) => return Err(SessionEnd::Closed),
            Ok(_) => continue,
            Err(e) => return Err(SessionEnd::Failed(format!("WebSocket error: {e}"))),
        };
        match decode_all(&text) {
            Ok(frames) => {
                if let Some(frame) = frames.into_iter().next() {
                    return Ok(frame);
                }
            }
            Err(e) => return Err(SessionEnd::Failed(format!("malformed handshake frame: {e}"))),
        }
    }
    Err(SessionEnd::Closed)
}

async fn send_frame(write: &mut WsWrite, frame: &Frame) -> Result<(), String> {
    write
        .send(WsMessage::Text(frame.encode().into()))
        .await
        .map_err(|e| format!("failed to send {}: {e}", frame.command))
}

async fn close(write: &mut WsWrite) -> Result<(), String> {
    write
        .send(WsMessage::Close(None))
        .await
        .map_err(|e| e.to_string())
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => pending::<()>().await,
    }
}
