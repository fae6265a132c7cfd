//! Notification subscriber: one reconnecting channel while enabled.

use std::sync::{Arc, Mutex, MutexGuard};

use hirehub_common::{CredentialProvider, Navigator, Toaster};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::translator::{job_toast, parse_event};
use super::types::{NotificationStatus, SubscriberSettings};
use crate::channel::{
    ChannelEvent, ChannelOptions, RealtimeChannel, RealtimeChannelFactory,
};

const NO_TOKEN: &str = "No authentication token";
const TRANSPORT_FAILED: &str = "WebSocket connection failed";

#[derive(Default)]
struct SubscriberState {
    enabled: bool,
    /// Bumped on every enable and disable; events from an older channel
    /// carry a stale generation and are dropped.
    generation: u64,
    channel: Option<Box<dyn RealtimeChannel>>,
    pump: Option<JoinHandle<()>>,
    status: NotificationStatus,
}

struct Shared {
    state: Mutex<SubscriberState>,
    status_tx: watch::Sender<NotificationStatus>,
    toaster: Arc<dyn Toaster>,
    navigator: Arc<dyn Navigator>,
    settings: SubscriberSettings,
}

/// Keeps a realtime channel open while enabled and toasts every nearby job.
pub struct NotificationSubscriber {
    shared: Arc<Shared>,
    factory: Arc<dyn RealtimeChannelFactory>,
    credentials: Arc<dyn CredentialProvider>,
}

impl NotificationSubscriber {
    pub fn new(
        factory: Arc<dyn RealtimeChannelFactory>,
        credentials: Arc<dyn CredentialProvider>,
        toaster: Arc<dyn Toaster>,
        navigator: Arc<dyn Navigator>,
        settings: SubscriberSettings,
    ) -> Self {
        let (status_tx, _) = watch::channel(NotificationStatus::default());
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SubscriberState::default()),
                status_tx,
                toaster,
                navigator,
                settings,
            }),
            factory,
            credentials,
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        if enabled {
            self.enable();
        } else {
            self.disable();
        }
    }

    /// Open the channel. No-op if already enabled.
    pub fn enable(&self) {
        let mut state = self.shared.lock();
        if state.enabled {
            return;
        }
        state.enabled = true;
        state.generation += 1;

        if self.credentials.current_token().is_none() {
            warn!("Not opening notification channel without an authentication token");
            self.shared
                .publish(&mut state, NotificationStatus::failed(NO_TOKEN));
            return;
        }

        let settings = &self.shared.settings;
        let options = ChannelOptions {
            url: settings.url.clone(),
            credentials: Arc::clone(&self.credentials),
            reconnect_delay: settings.reconnect_delay,
            heartbeat_outgoing: settings.heartbeat_outgoing,
            heartbeat_incoming: settings.heartbeat_incoming,
            connect_timeout: settings.connect_timeout,
        };
        let (channel, events) = self.factory.open(options);
        let generation = state.generation;
        state.channel = Some(channel);
        state.pump = Some(tokio::spawn(pump_events(
            Arc::clone(&self.shared),
            generation,
            events,
        )));
        info!(url = %settings.url, "Notification channel opened");
    }

    /// Deactivate and discard the channel. No-op if already disabled.
    pub fn disable(&self) {
        let (channel, pump) = {
            let mut state = self.shared.lock();
            if !state.enabled {
                return;
            }
            state.enabled = false;
            state.generation += 1;
            let released = (state.channel.take(), state.pump.take());
            self.shared
                .publish(&mut state, NotificationStatus::default());
            released
        };
        if let Some(channel) = channel {
            channel.deactivate();
        }
        if let Some(pump) = pump {
            pump.abort();
        }
        info!("Notification channel closed");
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.lock().enabled
    }

    pub fn status(&self) -> NotificationStatus {
        self.shared.lock().status.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<NotificationStatus> {
        self.shared.status_tx.subscribe()
    }
}

impl Drop for NotificationSubscriber {
    fn drop(&mut self) {
        self.disable();
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SubscriberState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, state: &mut SubscriberState, status: NotificationStatus) {
        state.status = status.clone();
        self.status_tx.send_replace(status);
    }

    /// Apply one channel event. Job toasts are shown with the lock held, so
    /// none can follow a `disable` that has returned.
    fn handle_event(&self, generation: u64, event: ChannelEvent) {
        let mut state = self.lock();
        if !state.enabled || state.generation != generation {
            debug!(?event, "Dropping event from discarded channel");
            return;
        }

        match event {
            ChannelEvent::Connecting => {
                let status = state.status.connecting();
                self.publish(&mut state, status);
            }
            ChannelEvent::Connected => {
                self.publish(&mut state, NotificationStatus::connected());
                if let Some(channel) = state.channel.as_ref() {
                    channel.subscribe(&self.settings.topic);
                }
                info!(topic = %self.settings.topic, "Connected to notification channel");
            }
            ChannelEvent::Message { destination, body } => {
                match parse_event(&body) {
                    Ok(job) => {
                        info!(
                            job_id = job.job_id,
                            skill = %job.skill_type,
                            "Nearby job notification"
                        );
                        let toast = job_toast(
                            &job,
                            Arc::clone(&self.navigator),
                            self.settings.toast_duration,
                        );
                        self.toaster.show(toast);
                    }
                    Err(e) => {
                        warn!(destination = %destination, error = %e, "Dropping malformed notification");
                    }
                }
            }
            ChannelEvent::StompError { message } => {
                warn!(message = %message, "Notification channel error");
                self.publish(
                    &mut state,
                    NotificationStatus::failed(format!("Connection error: {message}")),
                );
            }
            ChannelEvent::TransportError(detail) => {
                warn!(detail = %detail, "Notification transport error");
                self.publish(&mut state, NotificationStatus::failed(TRANSPORT_FAILED));
            }
            ChannelEvent::Disconnected => {
                info!("Disconnected from notification channel");
                self.publish(&mut state, NotificationStatus::default());
            }
        }
    }
}

/// Drain one channel's events in arrival order.
async fn pump_events(
    shared: Arc<Shared>,
    generation: u64,
    mut events: mpsc::Receiver<ChannelEvent>,
) {
    while let Some(event) = events.recv().await {
        shared.handle_event(generation, event);
    }
    debug!(generation, "Notification event stream ended");
}
