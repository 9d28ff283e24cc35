// Observer registry and snapshot fan-out.
// Each observer is a bounded channel; the connection task on the other end owns the socket.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::join_all;
use tokio::sync::mpsc;
use tokio::time::{Duration, timeout};

use crate::collector::MetricsCollector;
use crate::error::{CycleError, DeliveryError};
use crate::models::Snapshot;

/// Default bound on a single send to one observer.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(2);

/// Serialized snapshot, shared by every observer of one cycle.
pub type Payload = Arc<str>;

static NEXT_OBSERVER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl std::fmt::Display for ObserverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Send capability for one connected client. Liveness is the channel itself:
/// once the receiving side is dropped the observer is dead.
#[derive(Debug, Clone)]
pub struct Observer {
    id: ObserverId,
    tx: mpsc::Sender<Payload>,
}

impl Observer {
    pub fn new(tx: mpsc::Sender<Payload>) -> Self {
        Self {
            id: ObserverId(NEXT_OBSERVER_ID.fetch_add(1, Ordering::Relaxed)),
            tx,
        }
    }

    /// New observer plus the receiving end its connection task drains.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Payload>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self::new(tx), rx)
    }

    pub fn id(&self) -> ObserverId {
        self.id
    }

    pub fn is_alive(&self) -> bool {
        !self.tx.is_closed()
    }

    pub async fn deliver(&self, payload: Payload, send_timeout: Duration) -> Result<(), DeliveryError> {
        if !self.is_alive() {
            return Err(DeliveryError::Closed);
        }
        match timeout(send_timeout, self.tx.send(payload)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(DeliveryError::Closed),
            Err(_) => Err(DeliveryError::Timeout(send_timeout)),
        }
    }
}

/// Live observer registry. Broadcasts iterate a copy taken at cycle start.
#[derive(Debug, Default)]
pub struct ObserverSet {
    members: Mutex<BTreeMap<ObserverId, Observer>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the new member count.
    pub fn insert(&self, observer: Observer) -> usize {
        let mut members = self.lock();
        members.insert(observer.id(), observer);
        members.len()
    }

    /// Returns the remaining count if `id` was a member, `None` otherwise.
    pub fn remove(&self, id: ObserverId) -> Option<usize> {
        let mut members = self.lock();
        members.remove(&id).map(|_| members.len())
    }

    pub fn contains(&self, id: ObserverId) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn members(&self) -> Vec<Observer> {
        self.lock().values().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<ObserverId, Observer>> {
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Outcome of one publish: how many observers got the snapshot and which were dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub delivered: usize,
    pub pruned: Vec<ObserverId>,
}

pub struct Broadcaster {
    collector: Arc<MetricsCollector>,
    observers: ObserverSet,
    send_timeout: Duration,
}

impl Broadcaster {
    pub fn new(collector: Arc<MetricsCollector>, send_timeout: Duration) -> Self {
        Self {
            collector,
            observers: ObserverSet::new(),
            send_timeout,
        }
    }

    pub fn collector(&self) -> &Arc<MetricsCollector> {
        &self.collector
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn is_registered(&self, id: ObserverId) -> bool {
        self.observers.contains(id)
    }

    /// Seeds the observer with a fresh snapshot, then adds it to the broadcast set.
    /// An observer whose seed cannot be delivered is never added.
    pub async fn register(&self, observer: Observer) -> Result<(), DeliveryError> {
        let snapshot = self.collector.collect().await;
        let payload = encode(&snapshot).map_err(|e| DeliveryError::Encode(e.to_string()))?;
        observer.deliver(payload, self.send_timeout).await?;
        let total = self.observers.insert(observer.clone());
        tracing::info!(observer = %observer.id(), total, "Observer connected");
        Ok(())
    }

    /// Idempotent; removing an absent observer is a no-op.
    pub fn unregister(&self, id: ObserverId) {
        if let Some(remaining) = self.observers.remove(id) {
            tracing::info!(observer = %id, remaining, "Observer disconnected");
        }
    }

    /// One cycle: collect once, push to every observer, prune the ones that failed.
    pub async fn run_periodic_cycle(&self) -> Result<CycleReport, CycleError> {
        let snapshot = self.collector.collect().await;
        self.publish(&snapshot).await
    }

    /// Delivers to all current members concurrently, each send bounded by the send timeout.
    /// Observers that joined after the member copy was taken see the next cycle.
    pub async fn publish(&self, snapshot: &Snapshot) -> Result<CycleReport, CycleError> {
        if self.observers.is_empty() {
            tracing::debug!("No active observers, skipping broadcast");
            return Ok(CycleReport::default());
        }
        let payload = encode(snapshot)?;
        let members = self.observers.members();
        let send_timeout = self.send_timeout;
        let results = join_all(members.iter().map(|observer| {
            let payload = payload.clone();
            async move { (observer.id(), observer.deliver(payload, send_timeout).await) }
        }))
        .await;

        let mut report = CycleReport::default();
        for (id, result) in results {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!(observer = %id, error = %e, operation = "broadcast", "Error sending snapshot to observer");
                    report.pruned.push(id);
                }
            }
        }
        for id in &report.pruned {
            self.unregister(*id);
        }
        tracing::debug!(
            operation = "broadcast",
            delivered = report.delivered,
            pruned = report.pruned.len(),
            "Snapshot broadcast"
        );
        Ok(report)
    }
}

pub fn encode(snapshot: &Snapshot) -> Result<Payload, serde_json::Error> {
    serde_json::to_string(snapshot).map(Payload::from)
}
