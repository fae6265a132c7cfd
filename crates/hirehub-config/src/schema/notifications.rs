//! Job notification channel configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Real-time notification channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Path of the STOMP endpoint, appended to the API origin.
    pub ws_path: String,
    /// Per-user destination carrying job-proximity events.
    pub topic: String,
    pub reconnect_delay_ms: u32,
    /// Outgoing heart-beat interval; 0 disables.
    pub heartbeat_outgoing_ms: u32,
    /// Expected incoming heart-beat interval; 0 disables.
    pub heartbeat_incoming_ms: u32,
    pub connect_timeout_ms: u32,
    /// How long a job toast stays on screen.
    pub toast_duration_ms: u32,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            ws_path: "/ws".into(),
            topic: "/user/queue/nearby-jobs".into(),
            reconnect_delay_ms: 5_000,
            heartbeat_outgoing_ms: 4_000,
            heartbeat_incoming_ms: 4_000,
            connect_timeout_ms: 15_000,
            toast_duration_ms: 10_000,
        }
    }
}

impl NotificationsConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.reconnect_delay_ms))
    }

    pub fn heartbeat_outgoing(&self) -> Duration {
        Duration::from_millis(u64::from(self.heartbeat_outgoing_ms))
    }

    pub fn heartbeat_incoming(&self) -> Duration {
        Duration::from_millis(u64::from(self.heartbeat_incoming_ms))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.connect_timeout_ms))
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.toast_duration_ms))
    }
}
