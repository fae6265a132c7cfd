//! Turns inbound channel payloads into job toasts.

use std::sync::Arc;
use std::time::Duration;

use hirehub_common::{Navigator, Toast, ToastAction};

use super::types::JobProximityEvent;

/// Detail view for a job.
pub fn job_path(job_id: i64) -> String {
    format!("/worker/jobs/{job_id}")
}

pub(crate) fn parse_event(body: &str) -> Result<JobProximityEvent, serde_json::Error> {
    serde_json::from_str(body)
}

pub(crate) fn job_toast(
    event: &JobProximityEvent,
    navigator: Arc<dyn Navigator>,
    duration: Duration,
) -> Toast {
    Toast::success(format!(
        "New job near you: {} - {}",
        event.skill_type, event.location
    ))
    .with_duration(duration)
    .with_action(ToastAction::navigate(
        "View Job",
        navigator,
        job_path(event.job_id),
    ))
}
