//! Job-proximity notifications over a realtime channel.

mod subscriber;
mod translator;
mod types;

pub use subscriber::NotificationSubscriber;
pub use translator::job_path;
pub use types::{ChannelPhase, JobProximityEvent, NotificationStatus, SubscriberSettings};
