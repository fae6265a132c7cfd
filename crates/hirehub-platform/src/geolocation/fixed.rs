//! Providers that need no positioning hardware.

use std::time::Duration;

use hirehub_common::{PositionCallback, PositionSample, PositionWatcher, WatchId, WatchOptions};
use tracing::debug;

use super::WatchRegistry;

const REPORT_INTERVAL: Duration = Duration::from_secs(30);

/// Reports one configured coordinate, immediately and then periodically.
pub struct FixedPositionWatcher {
    latitude: f64,
    longitude: f64,
    registry: WatchRegistry,
}

impl FixedPositionWatcher {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            registry: WatchRegistry::default(),
        }
    }
}

impl PositionWatcher for FixedPositionWatcher {
    fn is_supported(&self) -> bool {
        true
    }

    fn watch_position(&self, _options: WatchOptions, callback: PositionCallback) -> WatchId {
        let id = self.registry.next_id();
        let (lat, lon) = (self.latitude, self.longitude);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(REPORT_INTERVAL);
            loop {
                ticker.tick().await;
                callback(Ok(PositionSample::now(lat, lon)));
            }
        });
        self.registry.insert(id, task);
        debug!(%id, "fixed position watch started");
        id
    }

    fn clear_watch(&self, id: WatchId) {
        if self.registry.cancel(id) {
            debug!(%id, "fixed position watch cleared");
        }
    }
}

/// A platform without any geolocation capability.
#[derive(Debug, Default)]
pub struct NoGeolocation;

impl PositionWatcher for NoGeolocation {
    fn is_supported(&self) -> bool {
        false
    }

    fn watch_position(&self, _options: WatchOptions, _callback: PositionCallback) -> WatchId {
        WatchId(0)
    }

    fn clear_watch(&self, _id: WatchId) {}
}
