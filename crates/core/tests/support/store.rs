//! Mock store implementation for testing
//!
//! Keeps the whole tree in one JSON value and records every write. Failure
//! injection covers the store-unavailable paths: going offline, failing
//! after a number of successful writes, and slow reads for timeouts.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lunchsync_core::{AvailabilityStore, Subscription, SubscriptionSink};
use lunchsync_domain::{LunchError, Result as DomainResult, StorePath};
use serde_json::{Map, Value};
use tokio::sync::Mutex as TokioMutex;

type WriteLog = Arc<TokioMutex<Vec<(String, Value)>>>;

/// In-memory mock for `AvailabilityStore`.
///
/// Subscriptions are accepted but never receive events; the coordinator
/// only reads and writes.
#[derive(Clone)]
pub struct MockStore {
    root: Arc<TokioMutex<Value>>,
    writes: WriteLog,
    sinks: Arc<TokioMutex<Vec<SubscriptionSink>>>,
    offline: Arc<AtomicBool>,
    writes_before_failure: Arc<AtomicUsize>,
    read_delay: Option<Duration>,
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new(Value::Object(Map::new()))
    }
}

impl MockStore {
    /// Create a new mock seeded with the provided tree.
    pub fn new(root: Value) -> Self {
        Self {
            root: Arc::new(TokioMutex::new(root)),
            writes: Arc::new(TokioMutex::new(Vec::new())),
            sinks: Arc::new(TokioMutex::new(Vec::new())),
            offline: Arc::new(AtomicBool::new(false)),
            writes_before_failure: Arc::new(AtomicUsize::new(usize::MAX)),
            read_delay: None,
        }
    }

    /// Delay every read, e.g. to exceed the coordinator's timeout.
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Let `count` more writes succeed, then fail every write.
    pub fn fail_after_writes(&self, count: usize) {
        self.writes_before_failure.store(count, Ordering::SeqCst);
    }

    pub async fn tree(&self) -> Value {
        self.root.lock().await.clone()
    }

    pub async fn get(&self, path: &str) -> Option<Value> {
        let path: StorePath = path.parse().expect("valid path");
        lookup(&*self.root.lock().await, &path).cloned()
    }

    pub async fn writes(&self) -> Vec<(String, Value)> {
        self.writes.lock().await.clone()
    }

    pub async fn write_count(&self) -> usize {
        self.writes.lock().await.len()
    }

    fn check_online(&self) -> DomainResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(LunchError::store("mock store offline"));
        }
        Ok(())
    }
}

fn lookup<'a>(root: &'a Value, path: &StorePath) -> Option<&'a Value> {
    path.segments().iter().try_fold(root, |node, segment| node.get(segment))
}

fn insert(root: &mut Value, path: &StorePath, value: Value) {
    let mut node = root;
    for segment in path.segments() {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        node = node
            .as_object_mut()
            .expect("node was just made an object")
            .entry(segment.clone())
            .or_insert(Value::Null);
    }
    *node = value;
}

#[async_trait]
impl AvailabilityStore for MockStore {
    async fn once(&self, path: &StorePath) -> DomainResult<Option<Value>> {
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
        self.check_online()?;
        Ok(lookup(&*self.root.lock().await, path).cloned())
    }

    async fn set(&self, path: &StorePath, value: Value) -> DomainResult<()> {
        self.check_online()?;
        let remaining = self.writes_before_failure.load(Ordering::SeqCst);
        if remaining == 0 {
            return Err(LunchError::store("mock write failure"));
        }
        if remaining != usize::MAX {
            self.writes_before_failure.store(remaining - 1, Ordering::SeqCst);
        }

        insert(&mut *self.root.lock().await, path, value.clone());
        self.writes.lock().await.push((path.to_string(), value));
        Ok(())
    }

    async fn subscribe(&self, _path: &StorePath) -> DomainResult<Subscription> {
        self.check_online()?;
        let (sink, subscription) = Subscription::channel();
        self.sinks.lock().await.push(sink);
        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_mock_store_reads_back_writes() {
        let store = MockStore::default();
        let path: StorePath = "users/u1/A".parse().unwrap();

        store.set(&path, json!(true)).await.unwrap();

        assert_eq!(store.once(&path).await.unwrap(), Some(json!(true)));
        assert_eq!(store.tree().await, json!({ "users": { "u1": { "A": true } } }));
        assert_eq!(store.write_count().await, 1);
    }

    #[tokio::test]
    async fn test_mock_store_failure_injection() {
        let store = MockStore::default();
        let path: StorePath = "going/u1".parse().unwrap();

        store.fail_after_writes(1);
        assert!(store.set(&path, json!(true)).await.is_ok());
        assert!(store.set(&path, json!(false)).await.is_err());

        store.set_offline(true);
        assert!(store.once(&path).await.is_err());
    }
}
