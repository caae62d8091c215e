//! Writes this session made to the engine's inputs
//!
//! Each local mutation already runs its own recompute. The feasibility
//! watcher receives the same writes as store notifications and claims them
//! here, so that only changes from other sessions make it recompute again.
//!
//! Tracking is off until a watcher turns it on: with nobody claiming,
//! entries would only pile up. Unclaimed entries expire after a TTL, which
//! covers writes whose notification never arrives (a concurrent identical
//! write turns ours into a no-op).

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use lunchsync_domain::{ChangeEvent, Collection, StorePath};
use parking_lot::Mutex;
use serde_json::Value;

#[derive(Debug)]
struct PendingWrite {
    path: StorePath,
    value: Value,
    recorded_at: Instant,
}

impl PendingWrite {
    /// Whether `change`, delivered for a direct child of `collection`,
    /// carries this write.
    fn matches(&self, collection: Collection, change: &ChangeEvent) -> bool {
        let Some((key, nested)) = self
            .path
            .relative_to(&StorePath::collection(collection))
            .and_then(<[String]>::split_first)
        else {
            return false;
        };

        *key == change.key
            && nested.iter().try_fold(&change.value, |node, segment| node.get(segment))
                == Some(&self.value)
    }
}

#[derive(Debug)]
pub(crate) struct LocalWrites {
    enabled: AtomicBool,
    ttl: Duration,
    pending: Mutex<Vec<PendingWrite>>,
}

impl LocalWrites {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self { enabled: AtomicBool::new(false), ttl, pending: Mutex::new(Vec::new()) }
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        if !enabled {
            self.pending.lock().clear();
        }
    }

    /// Remember a write about to be issued. `false` if tracking is off.
    pub(crate) fn record(&self, path: &StorePath, value: &Value) -> bool {
        if !self.enabled.load(Ordering::SeqCst) {
            return false;
        }
        let mut pending = self.pending.lock();
        self.prune(&mut pending);
        pending.push(PendingWrite {
            path: path.clone(),
            value: value.clone(),
            recorded_at: Instant::now(),
        });
        true
    }

    /// Drop a recorded write that never reached the store.
    pub(crate) fn forget(&self, path: &StorePath, value: &Value) {
        let mut pending = self.pending.lock();
        if let Some(index) = pending.iter().position(|w| w.path == *path && w.value == *value) {
            pending.remove(index);
        }
    }

    /// Consume the recorded write carried by `change`, if there is one.
    pub(crate) fn claim(&self, collection: Collection, change: &ChangeEvent) -> bool {
        let mut pending = self.pending.lock();
        self.prune(&mut pending);
        match pending.iter().position(|w| w.matches(collection, change)) {
            Some(index) => {
                pending.remove(index);
                true
            }
            None => false,
        }
    }

    fn prune(&self, pending: &mut Vec<PendingWrite>) {
        pending.retain(|w| w.recorded_at.elapsed() < self.ttl);
    }
}
