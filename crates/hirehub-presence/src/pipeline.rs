//! Availability switch driving both presence subsystems.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hirehub_common::Toaster;
use tokio::sync::watch;
use tracing::info;

use crate::location::{LocationReporter, LocationStatus};
use crate::notifications::{NotificationStatus, NotificationSubscriber};

const VISIBLE: &str = "You're now visible to employers";
const HIDDEN: &str = "You're now hidden from employers";

/// Snapshot of both subsystems.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceStatus {
    pub available: bool,
    pub location: LocationStatus,
    pub notifications: NotificationStatus,
}

/// Turns the worker's availability flag into location reporting plus job
/// notifications. Holds no recovery logic of its own.
pub struct PresencePipeline {
    reporter: LocationReporter,
    subscriber: NotificationSubscriber,
    toaster: Arc<dyn Toaster>,
    available: AtomicBool,
}

impl PresencePipeline {
    pub fn new(
        reporter: LocationReporter,
        subscriber: NotificationSubscriber,
        toaster: Arc<dyn Toaster>,
    ) -> Self {
        Self {
            reporter,
            subscriber,
            toaster,
            available: AtomicBool::new(false),
        }
    }

    /// Flip availability. Setting the current value again does nothing.
    pub fn set_available(&self, available: bool) {
        if self.available.swap(available, Ordering::SeqCst) == available {
            return;
        }
        self.reporter.set_enabled(available);
        self.subscriber.set_enabled(available);
        info!(available, "Availability changed");
        self.toaster.success(if available { VISIBLE } else { HIDDEN });
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> PresenceStatus {
        PresenceStatus {
            available: self.is_available(),
            location: self.reporter.status(),
            notifications: self.subscriber.status(),
        }
    }

    pub fn location_updates(&self) -> watch::Receiver<LocationStatus> {
        self.reporter.subscribe()
    }

    pub fn notification_updates(&self) -> watch::Receiver<NotificationStatus> {
        self.subscriber.subscribe()
    }

    /// Stop both subsystems without a toast.
    pub fn shutdown(&self) {
        self.available.store(false, Ordering::SeqCst);
        self.reporter.disable();
        self.subscriber.disable();
        info!("Presence pipeline shut down");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::channel::ChannelEvent;
    use crate::location::{LocationUpdate, ReporterSettings};
    use crate::notifications::SubscriberSettings;
    use crate::testing::{
        settle, FakeChannelFactory, FakeCredentials, FakeWatcher, RecordingNavigator,
        RecordingToaster, RecordingUploader,
    };

    struct Harness {
        pipeline: PresencePipeline,
        watcher: Arc<FakeWatcher>,
        uploader: Arc<RecordingUploader>,
        factory: Arc<FakeChannelFactory>,
        toaster: Arc<RecordingToaster>,
        navigator: Arc<RecordingNavigator>,
    }

    fn harness(credentials: Arc<FakeCredentials>) -> Harness {
        let watcher = FakeWatcher::new();
        let uploader = RecordingUploader::new();
        let factory = FakeChannelFactory::new();
        let toaster = RecordingToaster::new();
        let navigator = RecordingNavigator::new();
        let reporter = LocationReporter::new(
            watcher.clone(),
            uploader.clone(),
            credentials.clone(),
            toaster.clone(),
            ReporterSettings::default(),
        );
        let subscriber = NotificationSubscriber::new(
            factory.clone(),
            credentials,
            toaster.clone(),
            navigator.clone(),
            SubscriberSettings::default(),
        );
        Harness {
            pipeline: PresencePipeline::new(reporter, subscriber, toaster.clone()),
            watcher,
            uploader,
            factory,
            toaster,
            navigator,
        }
    }

    #[tokio::test]
    async fn availability_toggles_both_subsystems() {
        let h = harness(FakeCredentials::with_token("jwt"));
        h.pipeline.set_available(true);
        h.pipeline.set_available(true);

        assert!(h.pipeline.is_available());
        assert_eq!(h.watcher.started(), 1);
        assert_eq!(h.factory.opened(), 1);
        assert_eq!(
            h.toaster.messages(),
            vec!["You're now visible to employers".to_string()]
        );

        h.pipeline.set_available(false);
        assert_eq!(h.watcher.active(), 0);
        assert_eq!(h.factory.channel(0).calls.deactivations(), 1);
        assert_eq!(
            h.toaster.messages().last().map(String::as_str),
            Some("You're now hidden from employers")
        );
    }

    #[tokio::test]
    async fn no_token_leaves_both_inactive_with_errors() {
        let h = harness(FakeCredentials::empty());
        h.pipeline.set_available(true);

        let status = h.pipeline.status();
        assert!(!status.location.is_tracking);
        assert!(status.location.error.is_some());
        assert!(!status.notifications.is_connected);
        assert!(status.notifications.error.is_some());
        assert_eq!(h.watcher.started(), 0);
        assert_eq!(h.factory.opened(), 0);
    }

    #[tokio::test]
    async fn fix_and_job_event_end_to_end() {
        let h = harness(FakeCredentials::with_token("jwt-e2e"));
        h.pipeline.set_available(true);

        h.watcher.fix(19.0760, 72.8777);
        settle().await;
        assert_eq!(
            h.uploader.uploads(),
            vec![(
                "jwt-e2e".to_string(),
                LocationUpdate {
                    latitude: 19.0760,
                    longitude: 72.8777
                }
            )]
        );

        let channel = h.factory.channel(0);
        channel.emit(ChannelEvent::Connected).await;
        channel
            .emit(ChannelEvent::Message {
                destination: "/user/queue/nearby-jobs".into(),
                body: r#"{"jobId":42,"skillType":"Painting","location":"Andheri"}"#.into(),
            })
            .await;

        let jobs: Vec<_> = h
            .toaster
            .toasts()
            .into_iter()
            .filter(|t| t.action.is_some())
            .collect();
        assert_eq!(jobs.len(), 1);
        assert!(jobs[0].message.contains("Painting"));
        assert!(jobs[0].message.contains("Andheri"));
        if let Some(action) = &jobs[0].action {
            action.click();
        }
        assert!(h.navigator.paths()[0].contains("42"));

        let status = h.pipeline.status();
        assert!(status.available);
        assert!(status.location.is_tracking);
        assert!(status.notifications.is_connected);
    }

    #[tokio::test]
    async fn shutdown_is_silent() {
        let h = harness(FakeCredentials::with_token("jwt"));
        h.pipeline.set_available(true);
        h.pipeline.shutdown();

        assert!(!h.pipeline.is_available());
        assert_eq!(h.watcher.active(), 0);
        assert_eq!(h.toaster.messages().len(), 1);
    }
}
