//! Location reporter: position watch, upload and fixed-delay retry.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use hirehub_common::{
    CredentialProvider, PositionCallback, PositionError, PositionSample, PositionWatcher, Toaster,
    WatchId,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::types::{LocationStatus, ReporterSettings};
use super::uploader::{LocationUpdate, LocationUploader};

const NOT_SUPPORTED: &str = "Geolocation is not supported by your browser";
const NO_TOKEN: &str = "No authentication token";

#[derive(Default)]
struct ReporterState {
    enabled: bool,
    /// Bumped on every enable, disable and restart. Callbacks carry the
    /// generation they were created under and are dropped when it no longer
    /// matches.
    generation: u64,
    watch: Option<WatchId>,
    retry: Option<JoinHandle<()>>,
    status: LocationStatus,
}

/// What a new attempt has to release before it opens its watch.
struct Attempt {
    generation: u64,
    stale_watch: Option<WatchId>,
    stale_retry: Option<JoinHandle<()>>,
}

/// Supersede every callback and timer of the previous attempt.
fn begin_attempt(state: &mut ReporterState) -> Attempt {
    state.generation += 1;
    Attempt {
        generation: state.generation,
        stale_watch: state.watch.take(),
        stale_retry: state.retry.take(),
    }
}

struct Shared {
    state: Mutex<ReporterState>,
    status_tx: watch::Sender<LocationStatus>,
    watcher: Arc<dyn PositionWatcher>,
    uploader: Arc<dyn LocationUploader>,
    credentials: Arc<dyn CredentialProvider>,
    toaster: Arc<dyn Toaster>,
    settings: ReporterSettings,
}

/// Watches the device position while enabled and posts every fix.
///
/// Capabilities are never called with the state lock held: a watcher may
/// invoke its callback synchronously from `watch_position`.
pub struct LocationReporter {
    shared: Arc<Shared>,
}

impl LocationReporter {
    pub fn new(
        watcher: Arc<dyn PositionWatcher>,
        uploader: Arc<dyn LocationUploader>,
        credentials: Arc<dyn CredentialProvider>,
        toaster: Arc<dyn Toaster>,
        settings: ReporterSettings,
    ) -> Self {
        let (status_tx, _) = watch::channel(LocationStatus::default());
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ReporterState::default()),
                status_tx,
                watcher,
                uploader,
                credentials,
                toaster,
                settings,
            }),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        if enabled {
            self.enable();
        } else {
            self.disable();
        }
    }

    /// Start watching. No-op if already enabled.
    pub fn enable(&self) {
        {
            let mut state = self.shared.lock();
            if state.enabled {
                return;
            }
            state.enabled = true;
        }
        info!("Location tracking enabled");
        self.shared.start_attempt();
    }

    /// Stop watching and reset status. No-op if already disabled.
    pub fn disable(&self) {
        let (watch, retry) = {
            let mut state = self.shared.lock();
            if !state.enabled {
                return;
            }
            state.enabled = false;
            state.generation += 1;
            let released = (state.watch.take(), state.retry.take());
            self.shared.publish(&mut state, LocationStatus::default());
            released
        };
        if let Some(id) = watch {
            self.shared.watcher.clear_watch(id);
        }
        if let Some(retry) = retry {
            retry.abort();
        }
        info!("Location tracking disabled");
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.lock().enabled
    }

    pub fn status(&self) -> LocationStatus {
        self.shared.lock().status.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LocationStatus> {
        self.shared.status_tx.subscribe()
    }
}

impl Drop for LocationReporter {
    fn drop(&mut self) {
        self.disable();
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ReporterState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, state: &mut ReporterState, status: LocationStatus) {
        state.status = status.clone();
        self.status_tx.send_replace(status);
    }

    /// One full start sequence: release the old watch, check the gates and
    /// open a fresh watch.
    fn start_attempt(self: &Arc<Self>) {
        let attempt = {
            let mut state = self.lock();
            if !state.enabled {
                return;
            }
            begin_attempt(&mut state)
        };
        self.run_attempt(attempt);
    }

    fn run_attempt(self: &Arc<Self>, attempt: Attempt) {
        let Attempt {
            generation,
            stale_watch,
            stale_retry,
        } = attempt;
        if let Some(retry) = stale_retry {
            retry.abort();
        }
        if let Some(id) = stale_watch {
            self.watcher.clear_watch(id);
        }

        if !self.watcher.is_supported() {
            error!("No geolocation capability on this device");
            if self.fail_if_current(generation, NOT_SUPPORTED) {
                self.toaster.error(NOT_SUPPORTED);
            }
            return;
        }

        if self.credentials.current_token().is_none() {
            warn!("Not starting location tracking without an authentication token");
            self.fail_if_current(generation, NO_TOKEN);
            return;
        }

        let weak: Weak<Shared> = Arc::downgrade(self);
        let callback: PositionCallback = Arc::new(move |result| {
            if let Some(shared) = weak.upgrade() {
                shared.on_position(generation, result);
            }
        });
        let id = self.watcher.watch_position(self.settings.watch, callback);

        let orphan = {
            let mut state = self.lock();
            if state.enabled && state.generation == generation {
                state.watch = Some(id);
                None
            } else {
                Some(id)
            }
        };
        match orphan {
            Some(id) => self.watcher.clear_watch(id),
            None => debug!(%id, "Position watch started"),
        }
    }

    /// Record a start failure that gets no retry. Returns `false` if the
    /// attempt was superseded meanwhile.
    fn fail_if_current(&self, generation: u64, message: &str) -> bool {
        let mut state = self.lock();
        if !state.enabled || state.generation != generation {
            return false;
        }
        let status = state.status.failed(message);
        self.publish(&mut state, status);
        true
    }

    fn on_position(self: &Arc<Self>, generation: u64, result: Result<PositionSample, PositionError>) {
        match result {
            Ok(sample) => self.on_fix(generation, sample),
            Err(err) => self.on_failure(generation, err),
        }
    }

    fn on_fix(&self, generation: u64, sample: PositionSample) {
        let retry = {
            let mut state = self.lock();
            if !state.enabled || state.generation != generation {
                return;
            }
            self.publish(&mut state, LocationStatus::tracking(&sample));
            state.retry.take()
        };
        if let Some(retry) = retry {
            retry.abort();
            debug!("Pending location retry cancelled by fresh fix");
        }
        self.send(sample);
    }

    fn on_failure(self: &Arc<Self>, generation: u64, err: PositionError) {
        let message = err.user_message();
        {
            let mut state = self.lock();
            if !state.enabled || state.generation != generation {
                return;
            }
            let status = state.status.failed(message);
            self.publish(&mut state, status);

            // At most one retry is pending; further failures fold into it.
            let pending = state.retry.as_ref().is_some_and(|r| !r.is_finished());
            if !pending {
                state.retry = Some(self.schedule_retry(generation));
            }
        }
        warn!(kind = ?err.kind, detail = %err.detail, "Position watch failed");
        self.toaster.error(message);
    }

    fn schedule_retry(self: &Arc<Self>, generation: u64) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        let delay = self.settings.retry_delay;
        debug!(delay_ms = delay.as_millis() as u64, "Scheduling location retry");
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(shared) = weak.upgrade() {
                shared.retry(generation);
            }
        })
    }

    fn retry(self: &Arc<Self>, generation: u64) {
        let attempt = {
            let mut state = self.lock();
            if !state.enabled || state.generation != generation {
                return;
            }
            // This task's own handle; the restart below must not abort it.
            state.retry = None;
            begin_attempt(&mut state)
        };
        info!("Retrying location tracking");
        self.run_attempt(attempt);
    }

    /// Fire-and-forget upload of one fix.
    fn send(&self, sample: PositionSample) {
        let Some(token) = self.credentials.current_token() else {
            debug!("No authentication token; skipping location update");
            return;
        };
        let uploader = Arc::clone(&self.uploader);
        let update = LocationUpdate {
            latitude: sample.latitude,
            longitude: sample.longitude,
        };
        tokio::spawn(async move {
            if let Err(e) = uploader.upload(&token, update).await {
                warn!(error = %e, "Failed to update location");
            }
        });
    }
}
