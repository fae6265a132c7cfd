//! Deterministic fakes for the capabilities the pipeline depends on.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hirehub_common::{
    CredentialProvider, Navigator, PositionCallback, PositionError, PositionSample,
    PositionWatcher, Toast, Toaster, WatchId, WatchOptions,
};
use tokio::sync::mpsc;

use crate::channel::{ChannelEvent, ChannelOptions, RealtimeChannel, RealtimeChannelFactory};
use crate::error::PresenceError;
use crate::location::{LocationUpdate, LocationUploader};

/// Let spawned tasks run to their next await point.
pub(crate) async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

pub(crate) struct FakeCredentials(Mutex<Option<String>>);

impl FakeCredentials {
    pub fn with_token(token: &str) -> Arc<Self> {
        Arc::new(Self(Mutex::new(Some(token.to_string()))))
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self(Mutex::new(None)))
    }

    pub fn clear(&self) {
        *self.0.lock().unwrap() = None;
    }
}

impl CredentialProvider for FakeCredentials {
    fn current_token(&self) -> Option<String> {
        self.0.lock().unwrap().clone()
    }
}

// ---------------------------------------------------------------------------
// Geolocation
// ---------------------------------------------------------------------------

pub(crate) struct FakeWatcher {
    supported: bool,
    next_id: AtomicU64,
    active: Mutex<Vec<(WatchId, PositionCallback)>>,
    /// Every callback ever registered, including cleared ones.
    history: Mutex<Vec<PositionCallback>>,
    options: Mutex<Vec<WatchOptions>>,
    cleared: Mutex<Vec<WatchId>>,
}

impl FakeWatcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::with_support(true))
    }

    pub fn unsupported() -> Arc<Self> {
        Arc::new(Self::with_support(false))
    }

    fn with_support(supported: bool) -> Self {
        Self {
            supported,
            next_id: AtomicU64::new(1),
            active: Mutex::new(Vec::new()),
            history: Mutex::new(Vec::new()),
            options: Mutex::new(Vec::new()),
            cleared: Mutex::new(Vec::new()),
        }
    }

    /// Deliver `result` to every active watch.
    pub fn emit(&self, result: Result<PositionSample, PositionError>) {
        let callbacks: Vec<PositionCallback> = self
            .active
            .lock()
            .unwrap()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(result.clone());
        }
    }

    pub fn fix(&self, latitude: f64, longitude: f64) {
        self.emit(Ok(PositionSample::now(latitude, longitude)));
    }

    pub fn fail(&self, err: PositionError) {
        self.emit(Err(err));
    }

    /// The `n`th callback ever registered.
    pub fn callback(&self, n: usize) -> PositionCallback {
        Arc::clone(&self.history.lock().unwrap()[n])
    }

    pub fn started(&self) -> usize {
        self.history.lock().unwrap().len()
    }

    pub fn active(&self) -> usize {
        self.active.lock().unwrap().len()
    }

    pub fn cleared(&self) -> Vec<WatchId> {
        self.cleared.lock().unwrap().clone()
    }

    pub fn last_options(&self) -> Option<WatchOptions> {
        self.options.lock().unwrap().last().copied()
    }
}

impl PositionWatcher for FakeWatcher {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn watch_position(&self, options: WatchOptions, callback: PositionCallback) -> WatchId {
        let id = WatchId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.options.lock().unwrap().push(options);
        self.history.lock().unwrap().push(Arc::clone(&callback));
        self.active.lock().unwrap().push((id, callback));
        id
    }

    fn clear_watch(&self, id: WatchId) {
        self.active.lock().unwrap().retain(|(active, _)| *active != id);
        self.cleared.lock().unwrap().push(id);
    }
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct RecordingUploader {
    uploads: Mutex<Vec<(String, LocationUpdate)>>,
    reject: AtomicBool,
}

impl RecordingUploader {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reject_all(&self) {
        self.reject.store(true, Ordering::Relaxed);
    }

    pub fn uploads(&self) -> Vec<(String, LocationUpdate)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl LocationUploader for RecordingUploader {
    async fn upload(&self, token: &str, update: LocationUpdate) -> Result<(), PresenceError> {
        self.uploads
            .lock()
            .unwrap()
            .push((token.to_string(), update));
        if self.reject.load(Ordering::Relaxed) {
            return Err(PresenceError::Rejected { status: 500 });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct RecordingToaster {
    shown: Mutex<Vec<Toast>>,
}

impl RecordingToaster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.shown.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.toasts().into_iter().map(|t| t.message).collect()
    }
}

impl Toaster for RecordingToaster {
    fn show(&self, toast: Toast) {
        self.shown.lock().unwrap().push(toast);
    }
}

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn go_to(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_string());
    }
}

// ---------------------------------------------------------------------------
// Realtime channel
// ---------------------------------------------------------------------------

/// What the subscriber did to one fake channel.
#[derive(Default)]
pub(crate) struct ChannelCalls {
    subscriptions: Mutex<Vec<String>>,
    deactivations: AtomicUsize,
}

impl ChannelCalls {
    pub fn subscriptions(&self) -> Vec<String> {
        self.subscriptions.lock().unwrap().clone()
    }

    pub fn deactivations(&self) -> usize {
        self.deactivations.load(Ordering::Relaxed)
    }
}

struct FakeChannel(Arc<ChannelCalls>);

impl RealtimeChannel for FakeChannel {
    fn subscribe(&self, destination: &str) {
        self.0
            .subscriptions
            .lock()
            .unwrap()
            .push(destination.to_string());
    }

    fn deactivate(&self) {
        self.0.deactivations.fetch_add(1, Ordering::Relaxed);
    }
}

/// A channel handed out by [`FakeChannelFactory`], with the sending side of
/// its event stream so tests can play the server.
#[derive(Clone)]
pub(crate) struct OpenedChannel {
    pub options: ChannelOptions,
    pub events: mpsc::Sender<ChannelEvent>,
    pub calls: Arc<ChannelCalls>,
}

impl OpenedChannel {
    pub async fn emit(&self, event: ChannelEvent) {
        // A closed receiver means the subscriber let go of this channel.
        let _ = self.events.send(event).await;
        settle().await;
    }
}

#[derive(Default)]
pub(crate) struct FakeChannelFactory {
    opened: Mutex<Vec<OpenedChannel>>,
}

impl FakeChannelFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn opened(&self) -> usize {
        self.opened.lock().unwrap().len()
    }

    pub fn channel(&self, n: usize) -> OpenedChannel {
        self.opened.lock().unwrap()[n].clone()
    }
}

impl RealtimeChannelFactory for FakeChannelFactory {
    fn open(
        &self,
        options: ChannelOptions,
    ) -> (Box<dyn RealtimeChannel>, mpsc::Receiver<ChannelEvent>) {
        let (events, rx) = mpsc::channel(32);
        let calls = Arc::new(ChannelCalls::default());
        self.opened.lock().unwrap().push(OpenedChannel {
            options,
            events,
            calls: Arc::clone(&calls),
        });
        (Box::new(FakeChannel(calls)), rx)
    }
}
