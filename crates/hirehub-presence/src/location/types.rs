//! Status and settings types for the location reporter.

use std::time::Duration;

use hirehub_common::{PositionSample, WatchOptions};

/// Observable state of the location reporter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationStatus {
    pub is_tracking: bool,
    pub error: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationStatus {
    pub(crate) fn tracking(sample: &PositionSample) -> Self {
        Self {
            is_tracking: true,
            error: None,
            latitude: Some(sample.latitude),
            longitude: Some(sample.longitude),
        }
    }

    /// Keep the last known coordinates, mark tracking off and record `error`.
    pub(crate) fn failed(&self, error: impl Into<String>) -> Self {
        Self {
            is_tracking: false,
            error: Some(error.into()),
            ..self.clone()
        }
    }
}

/// Tuning for the location reporter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReporterSettings {
    pub watch: WatchOptions,
    /// Delay before restarting the watch after a failure.
    pub retry_delay: Duration,
}

impl Default for ReporterSettings {
    fn default() -> Self {
        Self {
            watch: WatchOptions::default(),
            retry_delay: Duration::from_secs(10),
        }
    }
}
