//! Commands and negotiated session parameters for the STOMP client.

use std::time::Duration;

/// Commands sent from a [`super::StompClient`] handle to its connection task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StompCommand {
    Subscribe { destination: String },
    Disconnect,
}

/// Heart-beat intervals agreed with the server for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Heartbeat {
    /// How often we must send something. `None` disables.
    pub send_every: Option<Duration>,
    /// How often the server promised to send something. `None` disables.
    pub expect_every: Option<Duration>,
}

impl Heartbeat {
    /// Value of the `heart-beat` header we offer in CONNECT.
    pub fn offer(outgoing: Duration, incoming: Duration) -> String {
        format!("{},{}", outgoing.as_millis(), incoming.as_millis())
    }

    /// Combine our offer with the server's `heart-beat` header.
    ///
    /// Each direction runs at the larger of the two sides' values, and is
    /// off when either side says 0. A missing or unparsable header means
    /// the server does no heart-beating.
    pub fn negotiate(outgoing: Duration, incoming: Duration, server: Option<&str>) -> Self {
        let (server_send, server_want) = server
            .and_then(|h| h.split_once(','))
            .and_then(|(sx, sy)| Some((sx.trim().parse::<u64>().ok()?, sy.trim().parse::<u64>().ok()?)))
            .unwrap_or((0, 0));
        Self {
            send_every: combine(outgoing.as_millis() as u64, server_want),
            expect_every: combine(incoming.as_millis() as u64, server_send),
        }
    }
}

fn combine(ours: u64, theirs: u64) -> Option<Duration> {
    if ours == 0 || theirs == 0 {
        None
    } else {
        Some(Duration::from_millis(ours.max(theirs)))
    }
}

/// `host` header value: the authority part of a `ws://` or `wss://` URL.
pub(crate) fn host_of(url: &str) -> &str {
    let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
    rest.split(|c: char| c == '/' || c == '?').next().unwrap_or(rest)
}
