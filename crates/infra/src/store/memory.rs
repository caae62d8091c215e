//! In-memory real-time store.
//!
//! Holds the shared tree as one JSON value and notifies subscribers about
//! added and changed children. Writes and notifications happen under one
//! lock, so every subscriber sees changes in the order they were applied.
//!
//! Semantics follow the hosted store the presentation layer talks to:
//! - `set` is an upsert; intermediate nodes are created as needed and a
//!   scalar in the way is replaced by an object
//! - setting `null` removes the node (no removal events are emitted)
//! - a write that leaves a child's value unchanged emits nothing
//! - a new subscription first receives `Added` for every existing child

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use lunchsync_core::{AvailabilityStore, Subscription, SubscriptionSink};
use lunchsync_domain::{ChangeEvent, ChangeKind, LunchError, Result as DomainResult, StorePath};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{debug, trace};

struct Subscriber {
    path: StorePath,
    sink: SubscriptionSink,
}

struct StoreInner {
    root: Value,
    subscribers: Vec<Subscriber>,
}

/// Which part of a subscribed node a write can affect
enum Scope {
    /// The write landed below this direct child
    Child(String),
    /// The write replaced the subscribed node or one of its ancestors
    Whole,
}

/// Process-local implementation of `AvailabilityStore`
pub struct InMemoryStore {
    inner: Mutex<StoreInner>,
    online: AtomicBool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::from_value(Value::Object(Map::new()))
    }

    /// Create a store pre-populated with `root`.
    pub fn from_value(root: Value) -> Self {
        Self {
            inner: Mutex::new(StoreInner { root, subscribers: Vec::new() }),
            online: AtomicBool::new(true),
        }
    }

    /// Simulate losing (or regaining) the connection. While offline every
    /// operation fails with `StoreUnavailable`; existing subscriptions stay
    /// registered.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
        debug!(online, "In-memory store connectivity changed");
    }

    /// Copy of the whole tree.
    pub fn dump(&self) -> Value {
        self.inner.lock().root.clone()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.subscribers.retain(|s| !s.sink.is_closed());
        inner.subscribers.len()
    }

    fn ensure_online(&self) -> DomainResult<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(LunchError::store("in-memory store is offline"))
        }
    }
}

fn lookup<'a>(root: &'a Value, path: &StorePath) -> Option<&'a Value> {
    path.segments().iter().try_fold(root, |node, segment| node.get(segment))
}

fn write(root: &mut Value, path: &StorePath, value: Value) {
    if !value.is_null() {
        write_at(root, path.segments(), value);
        return;
    }

    match path.segments().split_last() {
        None => *root = Value::Object(Map::new()),
        Some((last, parents)) => {
            let parent = parents.iter().try_fold(root, |node, segment| node.get_mut(segment));
            if let Some(Value::Object(children)) = parent {
                children.remove(last);
            }
        }
    }
}

/// Upsert below `node`, replacing any scalar in the way by an object.
fn write_at(node: &mut Value, segments: &[String], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *node = value;
        return;
    };
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(children) = node {
        write_at(children.entry(first.clone()).or_insert(Value::Null), rest, value);
    }
}

fn scope_of(subscribed: &StorePath, written: &StorePath) -> Option<Scope> {
    if let Some(rest) = written.relative_to(subscribed) {
        return Some(match rest.first() {
            Some(child) => Scope::Child(child.clone()),
            None => Scope::Whole,
        });
    }
    subscribed.relative_to(written).map(|_| Scope::Whole)
}

/// Added/changed events for the children of one node.
fn child_changes(before: Option<&Value>, after: Option<&Value>) -> Vec<ChangeEvent> {
    let Some(Value::Object(after)) = after else {
        return Vec::new();
    };
    let before = match before {
        Some(Value::Object(before)) => Some(before),
        _ => None,
    };

    after
        .iter()
        .filter_map(|(key, value)| match before.and_then(|b| b.get(key)) {
            None => Some(ChangeEvent::new(ChangeKind::Added, key.clone(), value.clone())),
            Some(old) if old != value => {
                Some(ChangeEvent::new(ChangeKind::Changed, key.clone(), value.clone()))
            }
            Some(_) => None,
        })
        .collect()
}

fn single_child_change(
    key: &str,
    before: Option<&Value>,
    after: Option<&Value>,
) -> Option<ChangeEvent> {
    let after = after?;
    match before {
        None => Some(ChangeEvent::new(ChangeKind::Added, key, after.clone())),
        Some(old) if old != after => Some(ChangeEvent::new(ChangeKind::Changed, key, after.clone())),
        Some(_) => None,
    }
}

#[async_trait]
impl AvailabilityStore for InMemoryStore {
    async fn once(&self, path: &StorePath) -> DomainResult<Option<Value>> {
        self.ensure_online()?;
        Ok(lookup(&self.inner.lock().root, path).cloned())
    }

    async fn set(&self, path: &StorePath, value: Value) -> DomainResult<()> {
        self.ensure_online()?;

        let mut guard = self.inner.lock();
        let StoreInner { root, subscribers } = &mut *guard;

        // Capture the pre-write state each related subscriber compares against.
        let before: Vec<(usize, Scope, Option<Value>)> = subscribers
            .iter()
            .enumerate()
            .filter_map(|(index, subscriber)| {
                let scope = scope_of(&subscriber.path, path)?;
                let previous = match &scope {
                    Scope::Child(key) => lookup(&*root, &subscriber.path.child(key)).cloned(),
                    Scope::Whole => lookup(&*root, &subscriber.path).cloned(),
                };
                Some((index, scope, previous))
            })
            .collect();

        write(root, path, value);
        trace!(path = %path, "In-memory store write applied");

        for (index, scope, previous) in before {
            let subscriber = &subscribers[index];
            let events = match scope {
                Scope::Child(key) => single_child_change(
                    &key,
                    previous.as_ref(),
                    lookup(&*root, &subscriber.path.child(&key)),
                )
                .into_iter()
                .collect(),
                Scope::Whole => child_changes(previous.as_ref(), lookup(&*root, &subscriber.path)),
            };
            for event in events {
                if !subscriber.sink.deliver(event) {
                    break;
                }
            }
        }

        subscribers.retain(|s| !s.sink.is_closed());
        Ok(())
    }

    async fn subscribe(&self, path: &StorePath) -> DomainResult<Subscription> {
        self.ensure_online()?;

        let (sink, subscription) = Subscription::channel();
        let mut inner = self.inner.lock();
        for event in child_changes(None, lookup(&inner.root, path)) {
            sink.deliver(event);
        }
        inner.subscribers.push(Subscriber { path: path.clone(), sink });
        debug!(path = %path, subscribers = inner.subscribers.len(), "Store subscription added");
        Ok(subscription)
    }
}
