//! Payload, status and settings types for the notification subscriber.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A job opening near the worker, pushed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProximityEvent {
    pub job_id: i64,
    pub skill_type: String,
    pub location: String,
}

/// Where the channel is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChannelPhase {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Observable state of the notification subscriber.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationStatus {
    pub is_connected: bool,
    pub error: Option<String>,
    pub phase: ChannelPhase,
}

impl NotificationStatus {
    pub(crate) fn connected() -> Self {
        Self {
            is_connected: true,
            error: None,
            phase: ChannelPhase::Connected,
        }
    }

    pub(crate) fn failed(error: impl Into<String>) -> Self {
        Self {
            is_connected: false,
            error: Some(error.into()),
            phase: ChannelPhase::Disconnected,
        }
    }

    /// A reconnect attempt keeps the last error visible until it succeeds.
    pub(crate) fn connecting(&self) -> Self {
        Self {
            is_connected: false,
            error: self.error.clone(),
            phase: ChannelPhase::Connecting,
        }
    }
}

/// Endpoint and timing for the notification channel.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriberSettings {
    pub url: String,
    pub topic: String,
    pub reconnect_delay: Duration,
    pub heartbeat_outgoing: Duration,
    pub heartbeat_incoming: Duration,
    pub connect_timeout: Duration,
    pub toast_duration: Duration,
}

impl Default for SubscriberSettings {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8080/ws".to_string(),
            topic: "/user/queue/nearby-jobs".to_string(),
            reconnect_delay: Duration::from_millis(5000),
            heartbeat_outgoing: Duration::from_millis(4000),
            heartbeat_incoming: Duration::from_millis(4000),
            connect_timeout: Duration::from_secs(15),
            toast_duration: Duration::from_secs(10),
        }
    }
}
