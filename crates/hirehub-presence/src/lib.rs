//! Worker presence pipeline.
//!
//! Two independent subsystems gated by the worker's availability:
//! - [`LocationReporter`] watches the device position and posts each fix
//!   to the backend, restarting the watch after a fixed delay on failure.
//! - [`NotificationSubscriber`] keeps a STOMP channel open and turns
//!   job-proximity events into actionable toasts.
//!
//! [`PresencePipeline`] flips both in lockstep.

pub mod channel;
pub mod error;
pub mod location;
pub mod notifications;
pub mod pipeline;
pub mod stomp;

#[cfg(test)]
mod testing;

pub use channel::{ChannelEvent, ChannelOptions, RealtimeChannel, RealtimeChannelFactory};
pub use error::PresenceError;
pub use location::{
    HttpLocationUploader, LocationReporter, LocationStatus, LocationUpdate, LocationUploader,
    ReporterSettings,
};
pub use notifications::{
    ChannelPhase, JobProximityEvent, NotificationStatus, NotificationSubscriber,
    SubscriberSettings,
};
pub use pipeline::{PresencePipeline, PresenceStatus};
pub use stomp::{StompChannelFactory, StompClient};
