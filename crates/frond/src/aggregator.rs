//! Aggregator: single owner of the feed window.
//!
//! One event loop holds the [Window] and processes everything that touches
//! it: incoming notifications (each spawns a resolver task), resolved stats
//! (window mutation), snapshot requests (full copy out), and cancellation.
//! Nothing else ever sees the window by reference, so mutation and reads
//! cannot interleave and no locks are needed. Snapshots reflect all
//! mutations processed before them at the loop and none after.

use crate::api::{FileStat, Notification};
use crate::resolver::Resolver;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio_util::sync::CancellationToken;

/// Cap on concurrently in-flight stat resolutions.
const MAX_IN_FLIGHT_RESOLVES: usize = 32;

/// Bounded window of the most recent publishes, oldest evicted first.
#[derive(Debug)]
pub struct Window {
    cap: usize,
    items: VecDeque<FileStat>,
}

impl Window {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            items: VecDeque::with_capacity(cap + 1),
        }
    }

    /// Append an item, evicting from the front to keep `len <= cap`.
    pub fn push(&mut self, item: FileStat) {
        self.items.push_back(item);
        while self.items.len() > self.cap {
            self.items.pop_front();
        }
    }

    /// Full copy of the current contents in insertion order.
    pub fn snapshot(&self) -> Vec<FileStat> {
        self.items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

type SnapshotRequest = oneshot::Sender<Vec<FileStat>>;

/// Handle for requesting window snapshots from a running [Aggregator].
#[derive(Clone)]
pub struct FeedHandle {
    snapshots: mpsc::Sender<SnapshotRequest>,
}

impl FeedHandle {
    /// One request/response round-trip with the aggregator. Returns `None`
    /// once the aggregator has shut down.
    pub async fn snapshot(&self) -> Option<Vec<FileStat>> {
        let (reply, rx) = oneshot::channel();
        self.snapshots.send(reply).await.ok()?;
        rx.await.ok()
    }
}

/// Owns the feed window and serializes all access to it.
pub struct Aggregator {
    window: Window,
    resolver: Resolver,
    notifications: mpsc::Receiver<Notification>,
    snapshots: mpsc::Receiver<SnapshotRequest>,
    resolved_tx: mpsc::Sender<FileStat>,
    resolved: mpsc::Receiver<FileStat>,
    resolve_slots: Arc<Semaphore>,
    cancel: CancellationToken,
}

impl Aggregator {
    pub fn new(
        resolver: Resolver,
        notifications: mpsc::Receiver<Notification>,
        feed_size: usize,
        cancel: CancellationToken,
    ) -> (Self, FeedHandle) {
        let (snapshot_tx, snapshots) = mpsc::channel(16);
        let (resolved_tx, resolved) = mpsc::channel(16);
        let aggregator = Self {
            window: Window::new(feed_size),
            resolver,
            notifications,
            snapshots,
            resolved_tx,
            resolved,
            resolve_slots: Arc::new(Semaphore::new(MAX_IN_FLIGHT_RESOLVES)),
            cancel,
        };
        (aggregator, FeedHandle { snapshots: snapshot_tx })
    }

    /// Run the event loop until canceled. Branch choice between ready
    /// events is unordered; cancellation never stays ready without winning
    /// a subsequent iteration.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                Some(notification) = self.notifications.recv() => {
                    self.spawn_resolve(notification);
                }
                Some(item) = self.resolved.recv() => {
                    self.window.push(item);
                }
                Some(reply) = self.snapshots.recv() => {
                    let _ = reply.send(self.window.snapshot());
                }
            }
        }
    }

    /// Fire-and-forget resolution of one notification. Failures end the
    /// task after a log line; only a success sends a window mutation.
    fn spawn_resolve(&self, notification: Notification) {
        let resolver = self.resolver.clone();
        let resolved_tx = self.resolved_tx.clone();
        let cancel = self.cancel.clone();
        let slots = Arc::clone(&self.resolve_slots);
        tokio::spawn(async move {
            let _permit = match slots.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };
            match resolver.resolve(&cancel, &notification).await {
                Ok(item) => {
                    let _ = resolved_tx.send(item).await;
                }
                Err(e) if e.is_cancellation() => {}
                Err(e) => {
                    tracing::warn!(from = %notification.from, reason = %e, "resolve publish failed");
                }
            }
        });
    }
}
