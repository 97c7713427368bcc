//! # Queue redirection options.
//!
//! [`QueueOptions`] is what a queueable event or listener reports: how long
//! to delay the job, and which connection / named queue should receive it.
//! Every field defaults to its zero value (no delay, default connection,
//! default queue).
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use herald::QueueOptions;
//!
//! let opts = QueueOptions::new()
//!     .with_delay(Duration::from_secs(60))
//!     .with_queue("mail");
//!
//! assert!(opts.is_delayed());
//! assert_eq!(opts.queue(), Some("mail"));
//! assert_eq!(opts.connection(), None);
//! ```

use std::time::Duration;

/// Where and when a redirected job should run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueueOptions {
    delay: Duration,
    connection: Option<String>,
    queue: Option<String>,
}

impl QueueOptions {
    /// Immediate job on the default connection and queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the delay before the job becomes available.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Selects a queue connection by name.
    pub fn with_connection(mut self, connection: impl Into<String>) -> Self {
        self.connection = Some(connection.into());
        self
    }

    /// Selects a named queue on the connection.
    pub fn with_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = Some(queue.into());
        self
    }

    /// Delay before the job becomes available (`0` = immediately).
    #[inline]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// True if the job must go through the scheduled enqueue path.
    #[inline]
    pub fn is_delayed(&self) -> bool {
        self.delay > Duration::ZERO
    }

    /// Requested connection, `None` for the manager's default.
    pub fn connection(&self) -> Option<&str> {
        self.connection.as_deref()
    }

    /// Requested queue, `None` for the connection's default.
    pub fn queue(&self) -> Option<&str> {
        self.queue.as_deref()
    }
}
