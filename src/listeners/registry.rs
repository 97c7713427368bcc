//! # Listener registry - ordered listeners per event name.
//!
//! ## Architecture
//! ```text
//! Registry
//!   └─► RwLock<HashMap<name, Vec<Job>>>
//!         "user.created" ─► [Inline(a), Queued(b, opts), Inline(a)]
//!         "order.placed" ─► [Inline(c)]
//!
//! listen(name, l)  ─► push Job (Inline | Queued decided from l.should_queue())
//! snapshot(name)   ─► Vec<Job> copy, lock released before any listener runs
//! unsubscribe()    ─► remove first pointer-equal entry, once
//! ```
//!
//! ## Rules
//! - Insertion order is invocation order; duplicates are kept and run once per entry.
//! - Every mutation takes the write lock once, so mutations are atomic w.r.t. each other.
//! - Dispatch iterates a snapshot: removing a listener mid-dispatch does not
//!   skip or repeat anything in the pass already running.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, Weak};

use tracing::debug;

use crate::listeners::listener::{same_listener, ListenerRef};
use crate::queue::QueueOptions;

type Table = RwLock<HashMap<String, Vec<Job>>>;

/// How a registered listener runs, decided at registration time.
#[derive(Clone)]
pub(crate) enum Job {
    /// Invoked inline by the dispatcher.
    Inline(ListenerRef),
    /// Redirected to the queue manager when one is configured.
    Queued(ListenerRef, QueueOptions),
}

impl Job {
    fn classify(listener: ListenerRef) -> Self {
        match listener.should_queue() {
            Some(opts) => Job::Queued(listener, opts),
            None => Job::Inline(listener),
        }
    }

    pub(crate) fn listener(&self) -> &ListenerRef {
        match self {
            Job::Inline(l) | Job::Queued(l, _) => l,
        }
    }
}

/// Ordered mapping from event name to listeners.
#[derive(Default)]
pub struct Registry {
    table: Arc<Table>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `listener` to the sequence for `event`.
    pub fn listen(&self, event: impl Into<String>, listener: ListenerRef) -> Subscription {
        let event = event.into();
        debug!(event = %event, listener = listener.name(), "listener registered");

        let job = Job::classify(Arc::clone(&listener));
        {
            let mut table = self.table.write().unwrap_or_else(|e| e.into_inner());
            table.entry(event.clone()).or_default().push(job);
        }

        Subscription {
            table: Arc::downgrade(&self.table),
            event,
            listener,
            done: AtomicBool::new(false),
        }
    }

    /// Number of listeners for `event` (0 if unknown).
    pub fn listener_count(&self, event: &str) -> usize {
        let table = self.table.read().unwrap_or_else(|e| e.into_inner());
        table.get(event).map_or(0, Vec::len)
    }

    /// True if `event` has at least one listener.
    pub fn has_listeners(&self, event: &str) -> bool {
        self.listener_count(event) > 0
    }

    /// Removes every listener for `event`.
    pub fn forget(&self, event: &str) {
        let mut table = self.table.write().unwrap_or_else(|e| e.into_inner());
        if table.remove(event).is_some() {
            debug!(event, "listeners forgotten");
        }
    }

    /// Removes every listener for every event.
    pub fn forget_all(&self) {
        let mut table = self.table.write().unwrap_or_else(|e| e.into_inner());
        table.clear();
        debug!("all listeners forgotten");
    }

    /// Returns sorted list of event names that currently have listeners.
    pub fn events(&self) -> Vec<String> {
        let table = self.table.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = table
            .iter()
            .filter(|(_, jobs)| !jobs.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort_unstable();
        names
    }

    /// Copy of the current sequence for `event`.
    pub(crate) fn snapshot(&self, event: &str) -> Vec<Job> {
        let table = self.table.read().unwrap_or_else(|e| e.into_inner());
        table.get(event).cloned().unwrap_or_default()
    }
}

/// Capability returned by `listen` that removes the registered listener.
///
/// Dropping a subscription does **not** remove the listener.
pub struct Subscription {
    table: Weak<Table>,
    event: String,
    listener: ListenerRef,
    done: AtomicBool,
}

impl Subscription {
    /// Removes the first pointer-equal occurrence of the listener.
    ///
    /// Only the first call has an effect; later calls are no-ops. Does nothing
    /// if the listener was already removed (e.g. by `forget`) or the registry is gone.
    pub fn unsubscribe(&self) {
        if self.done.swap(true, Ordering::AcqRel) {
            return;
        }
        let Some(table) = self.table.upgrade() else {
            return;
        };

        let mut table = table.write().unwrap_or_else(|e| e.into_inner());
        if let Some(jobs) = table.get_mut(&self.event) {
            if let Some(index) = jobs
                .iter()
                .position(|job| same_listener(job.listener(), &self.listener))
            {
                jobs.remove(index);
                debug!(event = %self.event, listener = self.listener.name(), "listener removed");
            }
        }
    }

    /// Event name the listener was registered for.
    pub fn event(&self) -> &str {
        &self.event
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .field("listener", &self.listener.name())
            .field("done", &self.done.load(Ordering::Relaxed))
            .finish()
    }
}
