//! Port interfaces for the real-time availability store
//!
//! The store is a path-addressable tree of JSON values shared by every
//! session. These traits define the boundary between core business logic
//! and the store adapters in `lunchsync-infra`.

use async_trait::async_trait;
use lunchsync_domain::{ChangeEvent, Result, StorePath};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Trait for reading, writing and watching the shared store
///
/// Adapters report every transport or backend failure as
/// `LunchError::StoreUnavailable`.
#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    /// Read the subtree at `path` once. `None` if nothing is stored there.
    async fn once(&self, path: &StorePath) -> Result<Option<Value>>;

    /// Upsert `value` at `path`. Last write wins.
    async fn set(&self, path: &StorePath, value: Value) -> Result<()>;

    /// Watch the direct children of `path`.
    ///
    /// Events are delivered in the order the store applies writes and are
    /// never coalesced. A child that already exists when the subscription is
    /// created is reported as `Added` first.
    async fn subscribe(&self, path: &StorePath) -> Result<Subscription>;
}

/// Receiving end of a store subscription.
///
/// Dropping the subscription cancels it.
#[derive(Debug)]
pub struct Subscription {
    events: mpsc::UnboundedReceiver<ChangeEvent>,
    cancel: CancellationToken,
}

/// Store-side end of a subscription
#[derive(Debug, Clone)]
pub struct SubscriptionSink {
    sender: mpsc::UnboundedSender<ChangeEvent>,
    cancel: CancellationToken,
}

/// Cloneable handle that cancels a subscription from anywhere
#[derive(Debug, Clone)]
pub struct SubscriptionHandle(CancellationToken);

impl Subscription {
    /// Create a connected sink/subscription pair.
    pub fn channel() -> (SubscriptionSink, Self) {
        let (sender, events) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        (SubscriptionSink { sender, cancel: cancel.clone() }, Self { events, cancel })
    }

    /// Wait for the next change. `None` once cancelled or once the store
    /// dropped its sink.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            event = self.events.recv() => event,
        }
    }

    /// Next change if one is already queued.
    pub fn try_next(&mut self) -> Option<ChangeEvent> {
        if self.cancel.is_cancelled() {
            return None;
        }
        self.events.try_recv().ok()
    }

    /// A handle that can cancel this subscription from another task.
    pub fn handle(&self) -> SubscriptionHandle {
        SubscriptionHandle(self.cancel.clone())
    }

    /// Stop receiving events.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether [`Self::cancel`] was called or a handle cancelled it.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl SubscriptionSink {
    /// Push an event to the subscriber.
    ///
    /// Returns `false` once the subscription is cancelled or dropped; the
    /// store should forget the sink at that point.
    pub fn deliver(&self, event: ChangeEvent) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.sender.send(event).is_ok()
    }

    /// Whether the subscriber is gone and the sink can be discarded.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled() || self.sender.is_closed()
    }
}

impl SubscriptionHandle {
    /// Cancel the subscription this handle was taken from.
    pub fn cancel(&self) {
        self.0.cancel();
    }

    /// Whether the subscription has been cancelled or dropped.
    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }
}
