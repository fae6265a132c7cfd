//! Terminal presentation of toasts and navigation.

use std::sync::{Mutex, MutexGuard};

use hirehub_common::{Navigator, Toast, ToastLevel, ToastQueue, Toaster};
use tracing::info;

/// Prints toasts to stdout and keeps them for the `open` command.
#[derive(Default)]
pub struct ConsoleToaster {
    queue: Mutex<ToastQueue>,
}

impl ConsoleToaster {
    fn queue(&self) -> MutexGuard<'_, ToastQueue> {
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run the action of the newest toast that still shows one.
    /// Returns `false` when there is nothing to open.
    pub fn open_latest(&self) -> bool {
        let action = self.queue().latest_actionable().and_then(|t| t.action.clone());
        match action {
            Some(action) => {
                action.click();
                true
            }
            None => false,
        }
    }
}

pub(crate) fn render(toast: &Toast) -> String {
    let marker = match toast.level {
        ToastLevel::Success => "✓",
        ToastLevel::Error => "✗",
    };
    match &toast.action {
        Some(action) => format!("{marker} {}  [open: {}]", toast.message, action.label),
        None => format!("{marker} {}", toast.message),
    }
}

impl Toaster for ConsoleToaster {
    fn show(&self, toast: Toast) {
        println!("{}", render(&toast));
        self.queue().push(toast);
    }
}

/// Resolves in-app paths against the web frontend and prints the link.
pub struct ConsoleNavigator {
    origin: String,
}

impl ConsoleNavigator {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn link(&self, path: &str) -> String {
        format!("{}{path}", self.origin)
    }
}

impl Navigator for ConsoleNavigator {
    fn go_to(&self, path: &str) {
        info!(path = %path, "Navigating");
        println!("→ {}", self.link(path));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use hirehub_common::ToastAction;

    #[test]
    fn render_marks_level_and_action() {
        assert_eq!(render(&Toast::success("saved")), "✓ saved");
        assert_eq!(render(&Toast::error("failed")), "✗ failed");
        let toast = Toast::success("New job near you: Painting - Andheri")
            .with_action(ToastAction::new("View Job", || {}));
        assert_eq!(
            render(&toast),
            "✓ New job near you: Painting - Andheri  [open: View Job]"
        );
    }

    #[test]
    fn open_latest_clicks_newest_action() {
        let toaster = ConsoleToaster::default();
        assert!(!toaster.open_latest());

        let clicks = Arc::new(AtomicUsize::new(0));
        let counter = clicks.clone();
        toaster.show(Toast::success("job").with_action(ToastAction::new("View Job", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })));
        toaster.success("You're now visible to employers");

        assert!(toaster.open_latest());
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn navigator_joins_origin_and_path() {
        let nav = ConsoleNavigator::new("http://localhost:5173/");
        assert_eq!(nav.link("/worker/jobs/42"), "http://localhost:5173/worker/jobs/42");
    }
}
