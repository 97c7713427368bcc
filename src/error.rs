//! Error types used by the dispatcher, listeners and queue collaborators.
//!
//! - [`DispatchError`]: errors surfaced to callers of `dispatch` / `until`.
//! - [`ListenerError`]: errors raised by individual listener invocations.
//! - [`QueueError`]: errors raised by a queue collaborator while enqueueing or processing.
//! - [`CommandError`]: errors of the `event` management command.
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use thiserror::Error;

/// # Errors produced by a dispatch call.
///
/// A dispatch call never swallows a listener failure: the failure is logged
/// and then returned wrapped in [`DispatchError::Listener`]. Replies collected
/// before the failure are discarded.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Queue redirection was attempted but no queue manager is configured.
    #[error("queue manager is not configured")]
    QueueNotConfigured,

    /// A listener failed while handling the event.
    #[error("listener {listener} failed for {event}: {source}")]
    Listener {
        /// Resolved event name.
        event: String,
        /// Name of the failing listener.
        listener: String,
        /// The listener's own error.
        #[source]
        source: ListenerError,
    },

    /// The queue manager refused to accept a redirected job.
    #[error("failed to enqueue {event}: {source}")]
    Enqueue {
        /// Resolved event name.
        event: String,
        /// The queue's own error.
        #[source]
        source: QueueError,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use herald::DispatchError;
    ///
    /// assert_eq!(DispatchError::QueueNotConfigured.as_label(), "dispatch_queue_not_configured");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::QueueNotConfigured => "dispatch_queue_not_configured",
            DispatchError::Listener { .. } => "dispatch_listener_failed",
            DispatchError::Enqueue { .. } => "dispatch_enqueue_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::QueueNotConfigured => "queue manager is not configured".to_string(),
            DispatchError::Listener {
                event,
                listener,
                source,
            } => format!("event={event} listener={listener} {}", source.as_message()),
            DispatchError::Enqueue { event, source } => {
                format!("event={event} {}", source.as_message())
            }
        }
    }

    /// Returns the listener error if this is a listener failure.
    pub fn listener_error(&self) -> Option<&ListenerError> {
        match self {
            DispatchError::Listener { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// # Errors produced by listener invocations.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListenerError {
    /// Listener failed while handling the payload.
    #[error("listener failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// A typed listener received a payload of another type.
    #[error("unexpected payload, expected {expected}")]
    UnexpectedPayload {
        /// Type name the listener expected.
        expected: &'static str,
    },
}

impl ListenerError {
    /// Shorthand for [`ListenerError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        ListenerError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use herald::ListenerError;
    ///
    /// assert_eq!(ListenerError::fail("boom").as_label(), "listener_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ListenerError::Fail { .. } => "listener_failed",
            ListenerError::UnexpectedPayload { .. } => "listener_unexpected_payload",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ListenerError::Fail { error } => format!("error: {error}"),
            ListenerError::UnexpectedPayload { expected } => {
                format!("unexpected payload: expected {expected}")
            }
        }
    }
}

/// # Errors produced by queue collaborators.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The requested queue connection does not exist.
    #[error("unknown queue connection: {name}")]
    UnknownConnection {
        /// Connection name that was requested.
        name: String,
    },

    /// The queue refused the job.
    #[error("job rejected: {reason}")]
    Rejected {
        /// Why the job was refused.
        reason: String,
    },

    /// The connection cannot perform the requested operation.
    #[error("the queue connection does not support {operation}")]
    Unsupported {
        /// Operation that was requested ("processing", "clearing").
        operation: &'static str,
    },

    /// A queued job failed while being processed.
    #[error("job {job} failed: {error}")]
    JobFailed {
        /// Event name of the failed job.
        job: String,
        /// The underlying error message.
        error: String,
    },
}

impl QueueError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            QueueError::UnknownConnection { .. } => "queue_unknown_connection",
            QueueError::Rejected { .. } => "queue_rejected",
            QueueError::Unsupported { .. } => "queue_unsupported",
            QueueError::JobFailed { .. } => "queue_job_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            QueueError::UnknownConnection { name } => format!("unknown connection: {name}"),
            QueueError::Rejected { reason } => format!("rejected: {reason}"),
            QueueError::Unsupported { operation } => format!("unsupported: {operation}"),
            QueueError::JobFailed { job, error } => format!("job={job} error: {error}"),
        }
    }
}

/// # Errors produced by the management command.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// The first argument did not name a known subcommand.
    #[error("unknown subcommand: {0}")]
    UnknownSubcommand(String),

    /// No queue manager was configured for the command.
    #[error("no queue manager configured")]
    NoQueue,

    /// The queue collaborator failed.
    #[error(transparent)]
    Queue(#[from] QueueError),
}

impl CommandError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CommandError::UnknownSubcommand(_) => "command_unknown_subcommand",
            CommandError::NoQueue => "command_no_queue",
            CommandError::Queue(_) => "command_queue_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            CommandError::UnknownSubcommand(name) => format!("unknown subcommand: {name}"),
            CommandError::NoQueue => "no queue manager configured".to_string(),
            CommandError::Queue(err) => err.as_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listener_failure_exposes_source() {
        let err = DispatchError::Listener {
            event: "user.created".into(),
            listener: "audit".into(),
            source: ListenerError::fail("boom"),
        };
        assert_eq!(err.as_label(), "dispatch_listener_failed");
        assert_eq!(err.listener_error(), Some(&ListenerError::fail("boom")));
        assert_eq!(
            err.to_string(),
            "listener audit failed for user.created: listener failed: boom"
        );
    }

    #[test]
    fn enqueue_message_includes_event() {
        let err = DispatchError::Enqueue {
            event: "mail.sent".into(),
            source: QueueError::Rejected {
                reason: "full".into(),
            },
        };
        assert_eq!(err.as_message(), "event=mail.sent rejected: full");
        assert!(err.listener_error().is_none());
    }

    #[test]
    fn command_error_wraps_queue_error() {
        let err: CommandError = QueueError::UnknownConnection {
            name: "redis".into(),
        }
        .into();
        assert_eq!(err.as_label(), "command_queue_failed");
        assert_eq!(err.to_string(), "unknown queue connection: redis");
    }
}
