//! Geolocation providers implementing [`hirehub_common::PositionWatcher`].

mod fixed;
mod gpsd;

pub use fixed::{FixedPositionWatcher, NoGeolocation};
pub use gpsd::GpsdWatcher;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use hirehub_common::WatchId;
use tokio::task::JoinHandle;

/// Background tasks backing active watches, keyed by id.
#[derive(Default)]
pub(crate) struct WatchRegistry {
    next_id: AtomicU64,
    tasks: Mutex<HashMap<WatchId, JoinHandle<()>>>,
}

impl WatchRegistry {
    pub(crate) fn next_id(&self) -> WatchId {
        WatchId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    pub(crate) fn insert(&self, id: WatchId, task: JoinHandle<()>) {
        self.tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, task);
    }

    /// Abort the task for `id`. Returns `false` if it was not registered.
    pub(crate) fn cancel(&self, id: WatchId) -> bool {
        let task = self
            .tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id);
        match task {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Drop for WatchRegistry {
    fn drop(&mut self) {
        let tasks = self.tasks.get_mut().unwrap_or_else(|e| e.into_inner());
        for (_, task) in tasks.drain() {
            task.abort();
        }
    }
}
