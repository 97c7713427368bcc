//! # Units of work handed to a queue manager.
//!
//! ```text
//! event redirection:     QueueJob::Event    { name, payload }           + JobMetadata { event: None }
//! listener redirection:  QueueJob::Listener { name, listener, event }   + JobMetadata { event: Some(event) }
//! ```
//!
//! The dispatcher never inspects a job after handing it over: it only awaits
//! the enqueue acknowledgement.

use std::fmt;

use crate::events::Payload;
use crate::listeners::ListenerRef;

/// A redirected event or listener invocation.
#[derive(Clone)]
pub enum QueueJob {
    /// The whole dispatch of a queueable event.
    Event {
        /// Resolved event name.
        name: String,
        /// The event itself.
        payload: Payload,
    },

    /// One queueable listener for one event.
    Listener {
        /// Resolved event name.
        name: String,
        /// Listener to invoke when the job runs.
        listener: ListenerRef,
        /// Event payload to pass to the listener.
        event: Payload,
    },
}

impl QueueJob {
    /// Event name the job was created for.
    pub fn name(&self) -> &str {
        match self {
            QueueJob::Event { name, .. } | QueueJob::Listener { name, .. } => name,
        }
    }

    /// The event payload carried by the job.
    pub fn payload(&self) -> &Payload {
        match self {
            QueueJob::Event { payload, .. } => payload,
            QueueJob::Listener { event, .. } => event,
        }
    }

    /// True for listener jobs.
    pub fn is_listener(&self) -> bool {
        matches!(self, QueueJob::Listener { .. })
    }
}

impl fmt::Debug for QueueJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueJob::Event { name, payload } => f
                .debug_struct("Event")
                .field("name", name)
                .field("payload", payload)
                .finish(),
            QueueJob::Listener {
                name,
                listener,
                event,
            } => f
                .debug_struct("Listener")
                .field("name", name)
                .field("listener", &listener.name())
                .field("event", event)
                .finish(),
        }
    }
}

/// Extra data passed alongside a job.
///
/// For listener jobs it carries the event so the queue can rebuild the call.
#[derive(Clone, Debug, Default)]
pub struct JobMetadata {
    /// The event a listener job was created for.
    pub event: Option<Payload>,
}

impl JobMetadata {
    /// Metadata carrying the triggering event.
    pub fn with_event(event: Payload) -> Self {
        Self { event: Some(event) }
    }
}
