//! # Broadcast channel for dispatched events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that records
//! one [`EventRecord`] per `dispatch` / `until` call and fans it out to every
//! live stream subscriber.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                       Subscribers (many):
//!   dispatch() ──┐                    ┌──► events()     (all records)
//!   until()    ──┼──► Bus ────────────┼──► of_type(n)   (records named n)
//!   ...        ──┘  (broadcast chan)  └──► on(n)        (payloads named n)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks and never fails.
//! - **Ordered**: every receiver observes records in `publish` order.
//! - **No replay**: a receiver only gets records sent after it subscribed.
//! - **Lag handling**: slow receivers skip the oldest overwritten records.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::broadcast;

use crate::events::Payload;

/// Global sequence counter for record ordering.
static RECORD_SEQ: AtomicU64 = AtomicU64::new(0);

/// One dispatched event as seen by stream subscribers.
///
/// Immutable once published; cheap to clone.
#[derive(Clone, Debug)]
pub struct EventRecord {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Resolved event name.
    pub name: Arc<str>,
    /// Effective payload of the dispatch.
    pub payload: Payload,
    /// Wall-clock time of the dispatch call.
    pub at: SystemTime,
}

impl EventRecord {
    /// Creates a record stamped with the current time and the next sequence number.
    pub fn now(name: impl Into<Arc<str>>, payload: Payload) -> Self {
        Self {
            seq: RECORD_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            name: name.into(),
            payload,
            at: SystemTime::now(),
        }
    }
}

/// Broadcast channel for event records.
///
/// ### Properties
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<EventRecord>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity.
    ///
    /// The capacity is shared across all receivers; the minimum is 1 (clamped).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<EventRecord>(capacity);
        Self { tx }
    }

    /// Records a dispatch and sends it to all active receivers.
    ///
    /// If there are no receivers the record is dropped.
    pub fn publish(&self, name: &str, payload: Payload) {
        let _ = self.tx.send(EventRecord::now(name, payload));
    }

    /// Creates a new receiver that observes subsequent records.
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
