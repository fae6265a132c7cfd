//! Validation for the location and notification sections.

use crate::schema::{HireHubConfig, LocationProvider};

use super::helpers::{validate_range, validate_range_f64};

/// Validate location reporter constraints.
pub(crate) fn validate_location(errors: &mut Vec<String>, config: &HireHubConfig) {
    let location = &config.location;
    validate_range(
        errors,
        "location.acquisition_timeout_ms",
        location.acquisition_timeout_ms,
        1_000,
        60_000,
    );
    validate_range(
        errors,
        "location.retry_delay_ms",
        location.retry_delay_ms,
        1_000,
        300_000,
    );

    match location.provider {
        LocationProvider::Gpsd => {
            if location.gpsd_addr.trim().is_empty() {
                errors.push("location.gpsd_addr must not be empty".into());
            }
        }
        LocationProvider::Static => {
            validate_range_f64(
                errors,
                "location.fixed.latitude",
                location.fixed.latitude,
                -90.0,
                90.0,
            );
            validate_range_f64(
                errors,
                "location.fixed.longitude",
                location.fixed.longitude,
                -180.0,
                180.0,
            );
        }
        LocationProvider::None => {}
    }
}

/// Validate notification channel constraints.
pub(crate) fn validate_notifications(errors: &mut Vec<String>, config: &HireHubConfig) {
    let n = &config.notifications;
    if !n.ws_path.starts_with('/') {
        errors.push(format!("notifications.ws_path = {} must start with '/'", n.ws_path));
    }
    if n.topic.trim().is_empty() {
        errors.push("notifications.topic must not be empty".into());
    }
    validate_range(
        errors,
        "notifications.reconnect_delay_ms",
        n.reconnect_delay_ms,
        500,
        60_000,
    );
    validate_range(
        errors,
        "notifications.heartbeat_outgoing_ms",
        n.heartbeat_outgoing_ms,
        0,
        60_000,
    );
    validate_range(
        errors,
        "notifications.heartbeat_incoming_ms",
        n.heartbeat_incoming_ms,
        0,
        60_000,
    );
    validate_range(
        errors,
        "notifications.connect_timeout_ms",
        n.connect_timeout_ms,
        1_000,
        120_000,
    );
    validate_range(
        errors,
        "notifications.toast_duration_ms",
        n.toast_duration_ms,
        1_000,
        60_000,
    );
}
