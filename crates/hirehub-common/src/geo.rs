//! Device geolocation capability.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// A single position fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub latitude: f64,
    pub longitude: f64,
    pub captured_at: DateTime<Utc>,
}

impl PositionSample {
    /// A fix captured now.
    pub fn now(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            captured_at: Utc::now(),
        }
    }
}

/// Why a position could not be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionErrorKind {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind:?}: {detail}")]
pub struct PositionError {
    pub kind: PositionErrorKind,
    pub detail: String,
}

impl PositionError {
    pub fn new(kind: PositionErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn permission_denied(detail: impl Into<String>) -> Self {
        Self::new(PositionErrorKind::PermissionDenied, detail)
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self::new(PositionErrorKind::PositionUnavailable, detail)
    }

    pub fn timeout(detail: impl Into<String>) -> Self {
        Self::new(PositionErrorKind::Timeout, detail)
    }

    /// Message shown to the worker for this failure category.
    pub fn user_message(&self) -> &'static str {
        match self.kind {
            PositionErrorKind::PermissionDenied => {
                "Location access required for receiving job requests nearby."
            }
            PositionErrorKind::PositionUnavailable => "Location information unavailable",
            PositionErrorKind::Timeout => "Location request timed out",
            PositionErrorKind::Other => "Unable to retrieve location",
        }
    }
}

/// Options for a continuous position watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub enable_high_accuracy: bool,
    /// Maximum time to wait for each fix.
    pub timeout: Duration,
    /// Oldest cached fix that may be reported. Zero means always fresh.
    pub maximum_age: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Handle for an active watch, returned by [`PositionWatcher::watch_position`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

impl fmt::Display for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "watch-{}", self.0)
    }
}

/// Receives every success and failure of a watch, in arrival order.
pub type PositionCallback = Arc<dyn Fn(Result<PositionSample, PositionError>) + Send + Sync>;

/// Platform geolocation service.
///
/// The callback may be invoked from any task, including synchronously from
/// inside `watch_position`. After `clear_watch` returns, the watcher must
/// not invoke the callback for that id again.
pub trait PositionWatcher: Send + Sync {
    /// Whether the platform can provide positions at all.
    fn is_supported(&self) -> bool;

    fn watch_position(&self, options: WatchOptions, callback: PositionCallback) -> WatchId;

    fn clear_watch(&self, id: WatchId);
}
