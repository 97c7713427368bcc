//! # StreamLogger: logs every dispatched record
//!
//! A minimal stream consumer that writes each [`EventRecord`] to `tracing`.
//! Use it for tests, demos or quick debugging of event flow.
//!
//! ## Example output
//! ```text
//! DEBUG herald::stream::log: event dispatched seq=0 event=user.created payload=demo::UserCreated
//! DEBUG herald::stream::log: event dispatched seq=1 event=orphan.event payload=()
//! ```

use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::debug;

use super::bus::EventRecord;
use super::streams::EventStream;

/// Stream consumer that logs records at `DEBUG`.
#[derive(Default)]
pub struct StreamLogger;

impl StreamLogger {
    /// Construct a new [`StreamLogger`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Logs one record.
    pub fn log(&self, record: &EventRecord) {
        debug!(
            seq = record.seq,
            event = %record.name,
            payload = record.payload.type_name(),
            "event dispatched"
        );
    }

    /// Spawns a task that logs every record of `stream` until it ends.
    ///
    /// Pass `dispatcher.events()`; the subscription is taken before spawning,
    /// so nothing dispatched after this call is missed.
    pub fn spawn(self, mut stream: EventStream) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(record) = stream.next().await {
                self.log(&record);
            }
        })
    }
}
