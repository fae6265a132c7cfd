//! Location reporting configuration.

use std::time::Duration;

use hirehub_common::WatchOptions;
use serde::{Deserialize, Serialize};

/// Which geolocation backend feeds the reporter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocationProvider {
    #[default]
    Gpsd,
    Static,
    None,
}

/// Coordinate reported by the `static` provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct FixedPosition {
    pub latitude: f64,
    pub longitude: f64,
}

/// Location reporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub provider: LocationProvider,
    pub high_accuracy: bool,
    /// Acquisition timeout per fix (valid range: 1000-60000 ms).
    pub acquisition_timeout_ms: u32,
    /// Oldest acceptable cached fix; 0 means always fresh.
    pub maximum_age_ms: u32,
    /// Delay before restarting a failed watch (valid range: 1000-300000 ms).
    pub retry_delay_ms: u32,
    /// Address of the gpsd daemon.
    pub gpsd_addr: String,
    pub fixed: FixedPosition,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            provider: LocationProvider::Gpsd,
            high_accuracy: true,
            acquisition_timeout_ms: 10_000,
            maximum_age_ms: 0,
            retry_delay_ms: 10_000,
            gpsd_addr: "127.0.0.1:2947".into(),
            fixed: FixedPosition::default(),
        }
    }
}

impl LocationConfig {
    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            enable_high_accuracy: self.high_accuracy,
            timeout: Duration::from_millis(u64::from(self.acquisition_timeout_ms)),
            maximum_age: Duration::from_millis(u64::from(self.maximum_age_ms)),
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.retry_delay_ms))
    }
}
