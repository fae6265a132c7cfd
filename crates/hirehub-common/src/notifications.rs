use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default on-screen time for a toast without an explicit duration.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(4);

/// Severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

/// Navigation service used by toast actions.
pub trait Navigator: Send + Sync {
    fn go_to(&self, path: &str);
}

/// A single user action attached to a toast.
#[derive(Clone)]
pub struct ToastAction {
    pub label: String,
    on_click: Arc<dyn Fn() + Send + Sync>,
}

impl ToastAction {
    pub fn new(label: impl Into<String>, on_click: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            on_click: Arc::new(on_click),
        }
    }

    /// An action that navigates to `path` when clicked.
    pub fn navigate(
        label: impl Into<String>,
        navigator: Arc<dyn Navigator>,
        path: impl Into<String>,
    ) -> Self {
        let path = path.into();
        Self::new(label, move || navigator.go_to(&path))
    }

    pub fn click(&self) {
        (self.on_click)();
    }
}

impl fmt::Debug for ToastAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastAction")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// A transient, auto-dismissing notification.
#[derive(Debug, Clone)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    pub duration: Duration,
    pub action: Option<ToastAction>,
    pub created_at: Instant,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
            duration: DEFAULT_TOAST_DURATION,
            action: None,
            created_at: Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            ..Self::success(message)
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_action(mut self, action: ToastAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Returns `true` once the toast has been on screen for its duration.
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }
}

/// Toast presentation service.
pub trait Toaster: Send + Sync {
    fn show(&self, toast: Toast);

    fn success(&self, message: &str) {
        self.show(Toast::success(message));
    }

    fn error(&self, message: &str) {
        self.show(Toast::error(message));
    }
}

/// A bounded queue of toasts that auto-evicts expired entries.
#[derive(Debug)]
pub struct ToastQueue {
    items: VecDeque<Toast>,
    capacity: usize,
}

impl ToastQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Pushes a toast, evicting expired entries first.
    /// If still at capacity after eviction, the oldest entry is removed.
    pub fn push(&mut self, toast: Toast) {
        self.evict_expired();
        if self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(toast);
    }

    /// Most recent visible toast that carries an action.
    pub fn latest_actionable(&mut self) -> Option<&Toast> {
        self.evict_expired();
        self.items.iter().rev().find(|t| t.action.is_some())
    }

    fn evict_expired(&mut self) {
        self.items.retain(|t| !t.is_expired());
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(16)
    }
}
